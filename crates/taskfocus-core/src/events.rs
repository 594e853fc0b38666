use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

/// Task-level notifications a session sends to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    ZeroTimeWork,
    ZeroTimeBreak,
    MarkInProgress,
    MarkAsCompleted,
}

impl TaskEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskEventKind::ZeroTimeWork => "zero_time_work",
            TaskEventKind::ZeroTimeBreak => "zero_time_break",
            TaskEventKind::MarkInProgress => "mark_in_progress",
            TaskEventKind::MarkAsCompleted => "mark_as_completed",
        }
    }

    /// Message shown to the user for this event.
    pub fn message(&self) -> &'static str {
        match self {
            TaskEventKind::ZeroTimeWork => "Out of time for work session, you can start a break",
            TaskEventKind::ZeroTimeBreak => "Out of time for break session, you can focus on task",
            TaskEventKind::MarkInProgress => "Task marked as in progress",
            TaskEventKind::MarkAsCompleted => "Task updated successfully",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Every observable change of a session produces an event.
/// The host renders them; none of them is required for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    SessionStateChanged {
        running: bool,
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Ticked {
        kind: SessionKind,
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    TaskEvent {
        kind: TaskEventKind,
        task_id: String,
        at: DateTime<Utc>,
    },
    SessionSwitched {
        from: SessionKind,
        to: SessionKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    FocusRecorded {
        task_id: String,
        seconds: u64,
        at: DateTime<Utc>,
    },
    Notification {
        level: NotificationLevel,
        message: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn notification(level: NotificationLevel, message: impl Into<String>) -> Self {
        SessionEvent::Notification {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn task_event_kind(&self) -> Option<TaskEventKind> {
        match self {
            SessionEvent::TaskEvent { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
