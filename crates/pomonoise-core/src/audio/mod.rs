//! Audio side of a session: looped noise playback and the alarm cue.

mod alarm;
mod output;
mod playback;

pub use alarm::{Alarm, AlarmPattern, CpalAlarm, SilentAlarm};
pub use output::{AudioOutput, CpalOutput};
pub use playback::{PlaybackController, PlaybackState, DEFAULT_GAIN};
