//! # taskfocus Core Library
//!
//! This library provides the core logic for running Pomodoro focus sessions
//! against tasks kept by a remote task service. The CLI binary is a thin
//! layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Engine**: A pure work/break state machine. Every operation
//!   returns the effects (remote writes, host events) the caller must carry out
//! - **Session Driver**: Owns a session on a tokio task, arms a one-second
//!   clock while it runs, and performs remote writes without blocking it
//! - **Gateways**: The task service seen through two narrow traits, with an
//!   HTTP client and an in-memory implementation
//! - **Stats**: Per-status task counts and weekly focus reports
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PomodoroSession`]: Core session state machine
//! - [`SessionDriver`]: Async runner handing out a [`SessionHandle`]
//! - [`TaskGateway`] / [`FocusTimeRecorder`]: Remote collaborators
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod gateway;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, GatewayError, SessionError};
pub use events::{NotificationLevel, SessionEvent, TaskEventKind};
pub use gateway::{FocusTimeRecorder, HttpGateway, MemoryGateway, TaskGateway};
pub use session::{
    Durations, Effect, PomodoroSession, SessionDriver, SessionHandle, SessionKind, SessionSnapshot,
};
pub use stats::{DailyFocus, FocusReport, FocusSummary, TaskStatusCount};
pub use storage::Config;
pub use task::{Priority, Task, TaskStatus};
