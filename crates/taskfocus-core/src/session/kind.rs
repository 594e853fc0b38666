use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::TaskEventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn other(self) -> Self {
        match self {
            SessionKind::Work => SessionKind::Break,
            SessionKind::Break => SessionKind::Work,
        }
    }

    /// Event fired when a session of this kind runs out of time.
    pub fn zero_time_event(self) -> TaskEventKind {
        match self {
            SessionKind::Work => TaskEventKind::ZeroTimeWork,
            SessionKind::Break => TaskEventKind::ZeroTimeBreak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work Session",
            SessionKind::Break => "Break Session",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configured length of each session kind, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_min: u32,
    pub break_min: u32,
}

impl Durations {
    pub fn new(work_min: u32, break_min: u32) -> Self {
        Self {
            work_min,
            break_min,
        }
    }

    pub fn minutes(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Work => self.work_min,
            SessionKind::Break => self.break_min,
        }
    }

    /// Duration of `kind` in seconds.
    pub fn secs(&self, kind: SessionKind) -> u64 {
        u64::from(self.minutes(kind)) * 60
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_min: 25,
            break_min: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations_are_classic_pomodoro() {
        let d = Durations::default();
        assert_eq!(d.secs(SessionKind::Work), 1500);
        assert_eq!(d.secs(SessionKind::Break), 300);
    }

    #[test]
    fn kinds_alternate() {
        assert_eq!(SessionKind::Work.other(), SessionKind::Break);
        assert_eq!(SessionKind::Break.other().other(), SessionKind::Break);
    }
}
