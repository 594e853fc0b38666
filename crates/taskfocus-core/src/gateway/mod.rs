//! Remote collaborators of a session.
//!
//! Both traits describe best-effort writes: the session never waits on
//! them and never retries. Implementations must hand out `Send` futures so
//! the driver can run them on a separate task.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::MemoryGateway;

use std::future::Future;

use crate::error::GatewayError;
use crate::task::{Task, TaskStatus};

/// Writes task status changes to the task service.
pub trait TaskGateway: Send + Sync {
    /// Change a task's status and return the service's updated copy.
    fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send;
}

/// Appends focused seconds to a task's history.
pub trait FocusTimeRecorder: Send + Sync {
    fn record_focused_seconds(
        &self,
        task_id: &str,
        seconds: u64,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
