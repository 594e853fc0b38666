mod clock;
mod driver;
mod engine;
mod kind;

pub use clock::{Tick, TickSource, TICK_PERIOD};
pub use driver::{SessionDriver, SessionHandle};
pub use engine::{Effect, PomodoroSession, SessionSnapshot};
pub use kind::{Durations, SessionKind};
