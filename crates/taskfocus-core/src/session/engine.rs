//! Pomodoro session state machine.
//!
//! The session is a pure state machine. It performs no I/O and owns no
//! timer: the caller delivers one `tick()` per elapsed second while the
//! session is running, and carries out the [`Effect`]s every operation
//! returns (remote writes, host events).
//!
//! ## State Transitions
//!
//! ```text
//! WorkPaused  <-> WorkRunning  --(0s)--> BreakPaused
//! BreakPaused <-> BreakRunning --(0s)--> WorkPaused
//! WorkPaused  <-- switch_kind --> BreakPaused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = PomodoroSession::new(Durations::default(), Some(task));
//! let effects = session.toggle_running()?;
//! // Once per second while running:
//! let effects = session.tick();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::kind::{Durations, SessionKind};
use crate::error::{GatewayError, SessionError};
use crate::events::{NotificationLevel, SessionEvent, TaskEventKind};
use crate::format::format_clock;
use crate::task::{Task, TaskStatus};

/// Work the caller must carry out on behalf of the session.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Persist focused seconds for a task. Best effort, no retry.
    RecordFocusedTime { task_id: String, seconds: u64 },
    /// Ask the task service to change a task's status.
    UpdateTaskStatus { task_id: String, status: TaskStatus },
    /// Deliver an event to the host.
    Emit(SessionEvent),
}

/// Serializable view of a session for hosts and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub kind: SessionKind,
    pub running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub display: String,
    pub progress_pct: f64,
    pub unrecorded_focus_secs: u64,
    pub task_id: Option<String>,
    pub task_name: Option<String>,
    pub task_status: Option<TaskStatus>,
}

#[derive(Debug, Clone)]
pub struct PomodoroSession {
    durations: Durations,
    kind: SessionKind,
    total_secs: u64,
    remaining_secs: u64,
    running: bool,
    /// Focused seconds accrued since the last recording.
    unrecorded_focus_secs: u64,
    /// Local copy of the selected task. Only merged after a successful write.
    task: Option<Task>,
}

impl PomodoroSession {
    /// Create a paused work session for `task`.
    pub fn new(durations: Durations, task: Option<Task>) -> Self {
        let total_secs = durations.secs(SessionKind::Work);
        Self {
            durations,
            kind: SessionKind::Work,
            total_secs,
            remaining_secs: total_secs,
            running: false,
            unrecorded_focus_secs: 0,
            task,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn unrecorded_focus_secs(&self) -> u64 {
        self.unrecorded_focus_secs
    }

    /// 0.0 .. 100.0 progress within the current session.
    pub fn progress_pct(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (self.total_secs - self.remaining_secs) as f64 / self.total_secs as f64 * 100.0
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            kind: self.kind,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            display: format_clock(self.remaining_secs),
            progress_pct: self.progress_pct(),
            unrecorded_focus_secs: self.unrecorded_focus_secs,
            task_id: self.task.as_ref().map(|t| t.id.clone()),
            task_name: self.task.as_ref().map(|t| t.name.clone()),
            task_status: self.task.as_ref().map(|t| t.status),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or pause the countdown.
    ///
    /// Starting requires a selected task whose status is `InProgress`.
    pub fn toggle_running(&mut self) -> Result<Vec<Effect>, SessionError> {
        if self.running {
            return Ok(self.stop());
        }

        let task = self.task.as_ref().ok_or(SessionError::NoTaskSelected)?;
        if !task.is_in_progress() {
            return Err(SessionError::TaskNotInProgress {
                task_id: task.id.clone(),
                status: task.status,
            });
        }
        self.running = true;
        Ok(vec![self.state_changed()])
    }

    /// Advance the countdown by one second. Ignored while paused.
    pub fn tick(&mut self) -> Vec<Effect> {
        if !self.running || self.remaining_secs == 0 {
            return Vec::new();
        }

        self.remaining_secs -= 1;
        if self.kind == SessionKind::Work {
            self.unrecorded_focus_secs += 1;
        }

        let mut effects = vec![Effect::Emit(SessionEvent::Ticked {
            kind: self.kind,
            remaining_secs: self.remaining_secs,
            display: format_clock(self.remaining_secs),
            at: Utc::now(),
        })];
        if self.remaining_secs == 0 {
            self.finish(&mut effects);
        }
        effects
    }

    /// Flip between work and break by hand. Rejected while running.
    pub fn switch_kind(&mut self) -> Result<Vec<Effect>, SessionError> {
        if self.running {
            return Err(SessionError::SwitchWhileRunning);
        }
        let mut effects = Vec::new();
        self.flush_focus(&mut effects);
        self.enter(self.kind.other(), &mut effects);
        Ok(effects)
    }

    /// Stop and rewind the current session kind to its full duration.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let was_running = self.running;
        self.running = false;
        self.flush_focus(&mut effects);
        self.total_secs = self.durations.secs(self.kind);
        self.remaining_secs = self.total_secs;
        effects.push(Effect::Emit(SessionEvent::SessionReset {
            kind: self.kind,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }));
        if was_running {
            effects.push(self.state_changed());
        }
        effects
    }

    pub fn mark_task_in_progress(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.request_status(TaskStatus::InProgress)
    }

    pub fn mark_task_completed(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.request_status(TaskStatus::Completed)
    }

    /// Apply the outcome of an `UpdateTaskStatus` effect.
    ///
    /// On success the service's task is merged into the local copy and the
    /// matching task event fires. On failure only a notification is emitted.
    pub fn apply_status_update(
        &mut self,
        task_id: &str,
        requested: TaskStatus,
        result: Result<Task, GatewayError>,
    ) -> Vec<Effect> {
        let Some(task) = self.task.as_mut().filter(|t| t.id == task_id) else {
            debug!(task_id, "status update for a task that is no longer selected");
            return Vec::new();
        };

        match result {
            Ok(remote) => {
                if !task.merge(remote) {
                    task.status = requested;
                }
                let in_progress = task.is_in_progress();

                // The timer may have been started while the write was in
                // flight. It must not keep running on a task that left
                // InProgress.
                let mut effects = if self.running && !in_progress {
                    self.stop()
                } else {
                    Vec::new()
                };
                let kind = match requested {
                    TaskStatus::InProgress => TaskEventKind::MarkInProgress,
                    TaskStatus::Completed => TaskEventKind::MarkAsCompleted,
                    _ => return effects,
                };
                effects.push(Effect::Emit(SessionEvent::TaskEvent {
                    kind,
                    task_id: task_id.to_string(),
                    at: Utc::now(),
                }));
                effects.push(Effect::Emit(SessionEvent::notification(
                    NotificationLevel::Success,
                    kind.message(),
                )));
                effects
            }
            Err(e) => {
                warn!(task_id, error = %e, "failed to update task status");
                vec![Effect::Emit(SessionEvent::notification(
                    NotificationLevel::Error,
                    "Failed to update task",
                ))]
            }
        }
    }

    /// Apply the outcome of a `RecordFocusedTime` effect.
    ///
    /// The countdown is never rolled back; a failed write loses those seconds.
    pub fn apply_record_result(
        &mut self,
        task_id: &str,
        seconds: u64,
        result: Result<(), GatewayError>,
    ) -> Vec<Effect> {
        match result {
            Ok(()) => vec![Effect::Emit(SessionEvent::FocusRecorded {
                task_id: task_id.to_string(),
                seconds,
                at: Utc::now(),
            })],
            Err(e) => {
                warn!(task_id, seconds, error = %e, "failed to save focused time");
                vec![Effect::Emit(SessionEvent::notification(
                    NotificationLevel::Error,
                    "Failed to save focused time",
                ))]
            }
        }
    }

    /// Take in a newer copy of the selected task from the host.
    ///
    /// With no task selected, `task` becomes the selection. A copy of some
    /// other task is ignored. If the task leaves `InProgress` while the
    /// timer runs, the session pauses.
    pub fn sync_task(&mut self, task: Task) -> Vec<Effect> {
        if let Some(current) = &self.task {
            if current.id != task.id {
                debug!(selected = %current.id, received = %task.id, "ignoring update for another task");
                return Vec::new();
            }
        }
        let in_progress = task.is_in_progress();
        self.task = Some(task);
        if self.running && !in_progress {
            return self.stop();
        }
        Vec::new()
    }

    /// Tear the session down, recording any pending focus time.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.running {
            return self.stop();
        }
        let mut effects = Vec::new();
        self.flush_focus(&mut effects);
        effects
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.running = false;
        self.flush_focus(&mut effects);
        effects.push(self.state_changed());
        effects
    }

    fn finish(&mut self, effects: &mut Vec<Effect>) {
        let finished = self.kind;
        self.running = false;
        self.flush_focus(effects);
        if let Some(task) = &self.task {
            effects.push(Effect::Emit(SessionEvent::TaskEvent {
                kind: finished.zero_time_event(),
                task_id: task.id.clone(),
                at: Utc::now(),
            }));
        }
        self.enter(finished.other(), effects);
        effects.push(self.state_changed());
    }

    fn enter(&mut self, kind: SessionKind, effects: &mut Vec<Effect>) {
        let from = self.kind;
        self.kind = kind;
        self.total_secs = self.durations.secs(kind);
        self.remaining_secs = self.total_secs;
        effects.push(Effect::Emit(SessionEvent::SessionSwitched {
            from,
            to: kind,
            duration_secs: self.total_secs,
            at: Utc::now(),
        }));
    }

    fn flush_focus(&mut self, effects: &mut Vec<Effect>) {
        if self.unrecorded_focus_secs == 0 {
            return;
        }
        let seconds = std::mem::take(&mut self.unrecorded_focus_secs);
        if let Some(task) = &self.task {
            effects.push(Effect::RecordFocusedTime {
                task_id: task.id.clone(),
                seconds,
            });
        }
    }

    fn request_status(&self, status: TaskStatus) -> Result<Vec<Effect>, SessionError> {
        let task = self.task.as_ref().ok_or(SessionError::NoTaskSelected)?;
        if self.running {
            return Err(SessionError::ActionWhileRunning);
        }
        if task.status == status {
            return Err(SessionError::AlreadyInStatus {
                task_id: task.id.clone(),
                status,
            });
        }
        Ok(vec![Effect::UpdateTaskStatus {
            task_id: task.id.clone(),
            status,
        }])
    }

    fn state_changed(&self) -> Effect {
        Effect::Emit(SessionEvent::SessionStateChanged {
            running: self.running,
            kind: self.kind,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }
}
