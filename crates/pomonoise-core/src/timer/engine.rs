//! Timer engine implementation.
//!
//! The timer engine is a one-second countdown state machine. It does not
//! schedule anything itself - the caller arms a tick through a
//! [`TickScheduler`](super::TickScheduler) and feeds the fired handle back
//! through [`TimerEngine::tick_from`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!        Finished -> Running (start) | Idle (reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SessionMode::Focus25);
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::SessionFinished) at zero
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::SessionMode;
use super::scheduler::TickHandle;
use crate::events::{Event, FinishEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Core timer engine.
///
/// `0 <= remaining_secs <= mode.total_seconds()` holds after every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: SessionMode,
    state: TimerState,
    remaining_secs: u32,
    /// The only tick this engine will currently accept.
    #[serde(skip)]
    pending: Option<TickHandle>,
}

impl TimerEngine {
    /// Create an idle engine with the full duration of `mode` remaining.
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            state: TimerState::Idle,
            remaining_secs: mode.total_seconds(),
            pending: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.mode.total_seconds()
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        let (mins, secs) = (self.remaining_secs / 60, self.remaining_secs % 60);
        format!("{mins:02}:{secs:02}")
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            display: self.display(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. While running this toggles to [`pause`](Self::pause).
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Idle | TimerState::Paused | TimerState::Finished => {
                // Never start a zero-length session.
                if self.state == TimerState::Finished || self.remaining_secs == 0 {
                    self.remaining_secs = self.total_secs();
                }
                self.state = TimerState::Running;
                Some(Event::TimerStarted {
                    mode: self.mode,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.pending = None;
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.pending = None;
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();
        Some(Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        })
    }

    /// Switch to `mode`. Always lands in `Idle` with the new full duration.
    pub fn change_mode(&mut self, mode: SessionMode) -> Option<Event> {
        self.mode = mode;
        self.reset();
        Some(Event::ModeChanged {
            mode,
            total_secs: self.total_secs(),
            at: Utc::now(),
        })
    }

    /// Advance one second. No-op unless running.
    ///
    /// Returns `Some(Event::SessionFinished)` on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.pending = None;
        self.state = TimerState::Finished;
        Some(Event::SessionFinished(FinishEvent {
            mode: self.mode,
            elapsed_minutes: self.mode.minutes(),
            at: Utc::now(),
        }))
    }

    /// Deliver a fired tick. Handles other than the pending one are stale
    /// and ignored.
    pub fn tick_from(&mut self, handle: TickHandle) -> Option<Event> {
        if self.pending != Some(handle) {
            tracing::debug!(tick = handle.id(), "ignoring stale tick");
            return None;
        }
        self.pending = None;
        self.tick()
    }

    /// Record `handle` as the next accepted tick, returning the handle it
    /// replaces (which the caller must cancel with its scheduler).
    pub fn arm(&mut self, handle: TickHandle) -> Option<TickHandle> {
        self.pending.replace(handle)
    }

    /// Forget the pending tick. Safe to call any number of times.
    pub fn cancel_pending(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(SessionMode::default())
    }
}
