//! In-process task store implementing both gateway traits.
//!
//! Backs the CLI's offline mode and the test suites. Failures can be
//! switched on per operation to exercise the notification paths.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{FocusTimeRecorder, TaskGateway};
use crate::error::GatewayError;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Default)]
struct State {
    tasks: HashMap<String, Task>,
    recordings: Vec<(String, u64)>,
    fail_status_updates: bool,
    fail_recordings: bool,
    status_delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let gateway = Self::new();
        for task in tasks {
            gateway.insert_task(task);
        }
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave State half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_task(&self, task: Task) {
        self.lock().tasks.insert(task.id.clone(), task);
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.lock().tasks.get(task_id).cloned()
    }

    /// Every successful recording, in arrival order.
    pub fn recordings(&self) -> Vec<(String, u64)> {
        self.lock().recordings.clone()
    }

    /// Total focused seconds recorded against `task_id`.
    pub fn focused_seconds(&self, task_id: &str) -> u64 {
        self.lock()
            .recordings
            .iter()
            .filter(|(id, _)| id == task_id)
            .map(|(_, secs)| secs)
            .sum()
    }

    pub fn set_fail_status_updates(&self, fail: bool) {
        self.lock().fail_status_updates = fail;
    }

    pub fn set_fail_recordings(&self, fail: bool) {
        self.lock().fail_recordings = fail;
    }

    /// Hold every status update for `delay` before answering.
    pub fn set_status_delay(&self, delay: Option<Duration>) {
        self.lock().status_delay = delay;
    }

    fn apply_status(&self, task_id: &str, status: TaskStatus) -> Result<Task, GatewayError> {
        let mut state = self.lock();
        if state.fail_status_updates {
            return Err(GatewayError::Unavailable("task service unavailable".into()));
        }
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| GatewayError::NotFound(task_id.to_string()))?;
        task.status = status;
        Ok(task.clone())
    }

    fn append_focus(&self, task_id: &str, seconds: u64) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.fail_recordings {
            return Err(GatewayError::Unavailable("focus service unavailable".into()));
        }
        if !state.tasks.contains_key(task_id) {
            return Err(GatewayError::NotFound(task_id.to_string()));
        }
        state.recordings.push((task_id.to_string(), seconds));
        Ok(())
    }
}

impl TaskGateway for MemoryGateway {
    async fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, GatewayError> {
        let delay = self.lock().status_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.apply_status(task_id, status)
    }
}

impl FocusTimeRecorder for MemoryGateway {
    async fn record_focused_seconds(&self, task_id: &str, seconds: u64) -> Result<(), GatewayError> {
        self.append_focus(task_id, seconds)
    }
}
