use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionMode, TimerState};

/// Emitted exactly once when a session counts down to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishEvent {
    pub mode: SessionMode,
    /// Nominal minutes of the mode, not measured wall-clock time.
    pub elapsed_minutes: u32,
    pub at: DateTime<Utc>,
}

/// Every state change in the system produces an Event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: SessionMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: SessionMode,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: SessionMode,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    SessionFinished(FinishEvent),
    StateSnapshot {
        state: TimerState,
        mode: SessionMode,
        remaining_secs: u32,
        total_secs: u32,
        display: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The finish payload, if this is a `SessionFinished` event.
    pub fn as_finish(&self) -> Option<&FinishEvent> {
        match self {
            Event::SessionFinished(finish) => Some(finish),
            _ => None,
        }
    }
}
