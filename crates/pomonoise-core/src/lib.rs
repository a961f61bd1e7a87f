//! # Pomonoise Core Library
//!
//! Focus-session timer with a colored-noise bed. The `pomonoise` CLI is a thin
//! shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven state machine. Ticks come from a
//!   [`TickScheduler`](timer::TickScheduler) and stale ones are ignored.
//! - **Noise**: white/pink/brown synthesis, cached once per color in memory
//!   and as WAV files on disk.
//! - **Audio**: looped playback and the end-of-session alarm over cpal.
//! - **Coordinator**: ties user intents, the timer and playback together.
//! - **Storage**: TOML configuration and the SQLite work log.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: timer state machine
//! - [`SessionCoordinator`]: intent routing and finish handling
//! - [`NoiseCache`]: one buffer per noise color
//! - [`WorkLog`]: completed focus sessions

pub mod audio;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod noise;
pub mod notify;
pub mod storage;
pub mod timer;

pub use audio::{AudioOutput, CpalOutput, PlaybackController};
pub use coordinator::{SessionCoordinator, TICK_INTERVAL};
pub use error::{AudioError, CacheError, ConfigError, CoreError, DatabaseError, NotifyError};
pub use events::{Event, FinishEvent};
pub use noise::{NoiseCache, NoiseColor, SampleBuffer};
pub use storage::{Config, LogEntry, WorkLog};
pub use timer::{SessionMode, TimerEngine, TimerState};
