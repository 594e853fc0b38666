//! One-second tick source with an explicit arm/disarm contract.
//!
//! At most one ticker task runs per source. Every tick carries the
//! generation it was armed under; disarming bumps the generation so that a
//! tick already sitting in the channel is recognised as stale and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub struct TickSource {
    period: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl TickSource {
    /// Create a disarmed source and the receiver its ticks arrive on.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            period,
            tx,
            generation: 0,
            ticker: None,
        };
        (source, rx)
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start ticking. The first tick arrives one full period from now.
    /// No-op when already armed. Must be called inside a tokio runtime.
    pub fn arm(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let tx = self.tx.clone();
        let period = self.period;
        let generation = self.generation;
        trace!(generation, "arming tick source");

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop ticking. Idempotent.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            self.generation += 1;
            trace!(generation = self.generation, "tick source disarmed");
        }
    }

    /// Whether `tick` was produced by the currently armed ticker.
    pub fn accepts(&self, tick: &Tick) -> bool {
        self.ticker.is_some() && tick.generation == self.generation
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_arrives_after_one_period() {
        let (mut source, mut rx) = TickSource::new(TICK_PERIOD);
        source.arm();

        time::advance(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        let tick = rx.recv().await.unwrap();
        assert!(source.accepts(&tick));
    }

    #[tokio::test(start_paused = true)]
    async fn arming_twice_keeps_a_single_ticker() {
        let (mut source, mut rx) = TickSource::new(TICK_PERIOD);
        source.arm();
        source.arm();

        time::sleep(Duration::from_millis(3500)).await;
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_is_idempotent_and_invalidates_old_ticks() {
        let (mut source, mut rx) = TickSource::new(TICK_PERIOD);
        source.arm();
        let stale = rx.recv().await.unwrap();

        source.disarm();
        source.disarm();
        assert!(!source.is_armed());
        assert_eq!(source.generation(), 1);
        assert!(!source.accepts(&stale));

        source.arm();
        assert!(!source.accepts(&stale));
        let fresh = rx.recv().await.unwrap();
        assert!(source.accepts(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_disarm() {
        let (mut source, mut rx) = TickSource::new(TICK_PERIOD);
        source.arm();
        source.disarm();

        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
