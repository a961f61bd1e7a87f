mod engine;
mod mode;
mod scheduler;

pub use engine::{TimerEngine, TimerState};
pub use mode::{ParseModeError, SessionKind, SessionMode};
pub use scheduler::{ManualScheduler, TickHandle, TickScheduler, TokioScheduler};
