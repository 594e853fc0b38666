//! Async host adapter for a [`PomodoroSession`].
//!
//! The driver task owns the session and serializes everything that can
//! change it: host commands, clock ticks, and completions of remote writes.
//! Remote writes run on their own tasks and never hold up the countdown.
//! The clock is armed exactly while the session is running.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::clock::{Tick, TickSource, TICK_PERIOD};
use super::engine::{Effect, PomodoroSession, SessionSnapshot};
use crate::error::{GatewayError, SessionError};
use crate::events::SessionEvent;
use crate::gateway::{FocusTimeRecorder, TaskGateway};
use crate::task::{Task, TaskStatus};

const COMMAND_BUFFER: usize = 32;

type Reply = oneshot::Sender<Result<SessionSnapshot, SessionError>>;

enum Command {
    Toggle(Reply),
    SwitchKind(Reply),
    Reset(Reply),
    MarkInProgress(Reply),
    MarkCompleted(Reply),
    SyncTask(Task, Reply),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Close(oneshot::Sender<SessionSnapshot>),
}

enum Completion {
    Recorded {
        task_id: String,
        seconds: u64,
        result: Result<(), GatewayError>,
    },
    StatusUpdated {
        task_id: String,
        requested: TaskStatus,
        result: Result<Task, GatewayError>,
    },
}

/// Cloneable handle to a running session driver.
///
/// The driver shuts down after [`SessionHandle::close`] or once every
/// handle has been dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub async fn toggle_running(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::Toggle).await
    }

    pub async fn switch_kind(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::SwitchKind).await
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::Reset).await
    }

    pub async fn mark_in_progress(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::MarkInProgress).await
    }

    pub async fn mark_completed(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(Command::MarkCompleted).await
    }

    /// Push a newer copy of the selected task into the session.
    pub async fn sync_task(&self, task: Task) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| Command::SyncTask(task, reply)).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Stop the driver. Pending focus time is written before this returns.
    pub async fn close(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Close(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply) -> Command,
    ) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(command(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

pub struct SessionDriver<T, R> {
    session: PomodoroSession,
    tasks: Arc<T>,
    recorder: Arc<R>,
    clock: TickSource,
    ticks: mpsc::UnboundedReceiver<Tick>,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<T, R> SessionDriver<T, R>
where
    T: TaskGateway + 'static,
    R: FocusTimeRecorder + 'static,
{
    /// Move `session` onto a driver task.
    ///
    /// Returns the command handle and the stream of events for the host.
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        session: PomodoroSession,
        tasks: Arc<T>,
        recorder: Arc<R>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (events, event_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (clock, ticks) = TickSource::new(TICK_PERIOD);

        let driver = Self {
            session,
            tasks,
            recorder,
            clock,
            ticks,
            commands,
            completions_tx,
            completions,
            events,
        };
        tokio::spawn(driver.run());

        (SessionHandle { commands: command_tx }, event_rx)
    }

    async fn run(mut self) {
        info!(
            task_id = ?self.session.task().map(|t| t.id.as_str()),
            kind = %self.session.kind(),
            "session opened"
        );

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Close(reply)) => {
                        let snapshot = self.shutdown().await;
                        let _ = reply.send(snapshot);
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
                Some(done) = self.completions.recv() => self.complete(done),
                Some(tick) = self.ticks.recv() => {
                    if self.clock.accepts(&tick) {
                        let effects = self.session.tick();
                        self.execute(effects);
                    } else {
                        debug!(generation = tick.generation, "dropping stale tick");
                    }
                }
            }
            self.sync_clock();
        }

        info!("session closed");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Toggle(reply) => {
                let outcome = self.session.toggle_running();
                self.respond(outcome, reply);
            }
            Command::SwitchKind(reply) => {
                let outcome = self.session.switch_kind();
                self.respond(outcome, reply);
            }
            Command::Reset(reply) => {
                let effects = self.session.reset();
                self.respond(Ok(effects), reply);
            }
            Command::MarkInProgress(reply) => {
                let outcome = self.session.mark_task_in_progress();
                self.respond(outcome, reply);
            }
            Command::MarkCompleted(reply) => {
                let outcome = self.session.mark_task_completed();
                self.respond(outcome, reply);
            }
            Command::SyncTask(task, reply) => {
                let effects = self.session.sync_task(task);
                self.respond(Ok(effects), reply);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Close(_) => unreachable!("close is handled by the run loop"),
        }
    }

    fn respond(&mut self, outcome: Result<Vec<Effect>, SessionError>, reply: Reply) {
        let result = match outcome {
            Ok(effects) => {
                self.execute(effects);
                // Arm or disarm before the host sees the new state.
                self.sync_clock();
                Ok(self.session.snapshot())
            }
            Err(e) => {
                debug!(error = %e, "session command rejected");
                Err(e)
            }
        };
        let _ = reply.send(result);
    }

    fn complete(&mut self, done: Completion) {
        let effects = match done {
            Completion::Recorded {
                task_id,
                seconds,
                result,
            } => self.session.apply_record_result(&task_id, seconds, result),
            Completion::StatusUpdated {
                task_id,
                requested,
                result,
            } => self.session.apply_status_update(&task_id, requested, result),
        };
        self.execute(effects);
    }

    /// Carry out effects without waiting on remote writes.
    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event),
                Effect::RecordFocusedTime { task_id, seconds } => {
                    let recorder = Arc::clone(&self.recorder);
                    let done = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let result = recorder.record_focused_seconds(&task_id, seconds).await;
                        let _ = done.send(Completion::Recorded {
                            task_id,
                            seconds,
                            result,
                        });
                    });
                }
                Effect::UpdateTaskStatus { task_id, status } => {
                    let tasks = Arc::clone(&self.tasks);
                    let done = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let result = tasks.update_task_status(&task_id, status).await;
                        let _ = done.send(Completion::StatusUpdated {
                            task_id,
                            requested: status,
                            result,
                        });
                    });
                }
            }
        }
    }

    /// Teardown: disarm first so no tick can land, then write out pending
    /// focus time and wait for it.
    async fn shutdown(&mut self) -> SessionSnapshot {
        self.clock.disarm();
        let effects = self.session.close();
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event),
                Effect::RecordFocusedTime { task_id, seconds } => {
                    let result = self.recorder.record_focused_seconds(&task_id, seconds).await;
                    for follow_up in self.session.apply_record_result(&task_id, seconds, result) {
                        if let Effect::Emit(event) = follow_up {
                            self.emit(event);
                        }
                    }
                }
                Effect::UpdateTaskStatus { .. } => {}
            }
        }
        self.session.snapshot()
    }

    fn sync_clock(&mut self) {
        if self.session.is_running() {
            self.clock.arm();
        } else {
            self.clock.disarm();
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The host may have stopped listening; the session keeps going.
        let _ = self.events.send(event);
    }
}
