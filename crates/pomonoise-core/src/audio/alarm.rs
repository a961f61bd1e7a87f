//! End-of-session alarm cue.
//!
//! The cue is a fixed list of (tone, gap) pairs rendered into a one-shot
//! buffer and played on its own thread, so ringing never blocks the tick loop.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use crate::noise::{SampleBuffer, SAMPLE_RATE};

use super::output::CpalOutput;

/// Peak amplitude of a rendered tone.
const TONE_AMPLITUDE: f64 = 16_000.0;
/// Extra time the stream is kept alive after the cue ends.
const TAIL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmPattern {
    pub frequency_hz: f64,
    /// Each step is a tone followed by silence.
    pub steps: Vec<(Duration, Duration)>,
}

impl Default for AlarmPattern {
    /// Three triple-beeps: 200 ms at 1 kHz, 100 ms apart, 800 ms between triples.
    fn default() -> Self {
        let beep = Duration::from_millis(200);
        let short = Duration::from_millis(100);
        let long = Duration::from_millis(800);
        let triple = [(beep, short), (beep, short), (beep, long)];
        Self {
            frequency_hz: 1000.0,
            steps: triple.iter().copied().cycle().take(9).collect(),
        }
    }
}

impl AlarmPattern {
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|(tone, gap)| *tone + *gap).sum()
    }

    /// Render the cue as a mono buffer at `sample_rate`.
    pub fn render(&self, sample_rate: u32) -> SampleBuffer {
        let frames = |d: Duration| (d.as_secs_f64() * sample_rate as f64).round() as usize;
        let mut samples = Vec::with_capacity(frames(self.total_duration()));
        for &(tone, gap) in &self.steps {
            let n = frames(tone);
            samples.extend((0..n).map(|i| {
                let t = i as f64 / sample_rate as f64;
                (TONE_AMPLITUDE * (TAU * self.frequency_hz * t).sin()) as i16
            }));
            samples.extend(std::iter::repeat(0).take(frames(gap)));
        }
        SampleBuffer::new(samples, sample_rate)
    }
}

/// Something that can signal the end of a session. Must return promptly.
pub trait Alarm {
    fn ring(&self);
}

/// Plays the cue through the default output device on a detached thread.
#[derive(Debug, Clone)]
pub struct CpalAlarm {
    pattern: AlarmPattern,
    gain: f32,
}

impl CpalAlarm {
    pub fn new(pattern: AlarmPattern, gain: f32) -> Self {
        Self { pattern, gain }
    }
}

impl Default for CpalAlarm {
    fn default() -> Self {
        Self::new(AlarmPattern::default(), 1.0)
    }
}

impl Alarm for CpalAlarm {
    fn ring(&self) {
        let pattern = self.pattern.clone();
        let gain = self.gain;
        std::thread::spawn(move || {
            let buffer = Arc::new(pattern.render(SAMPLE_RATE));
            match CpalOutput::play_once(buffer, gain) {
                Ok(stream) => {
                    std::thread::sleep(pattern.total_duration() + TAIL);
                    drop(stream);
                }
                Err(e) => tracing::warn!(error = %e, "alarm unavailable"),
            }
        });
    }
}

/// Alarm that does nothing, for when the cue is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlarm;

impl Alarm for SilentAlarm {
    fn ring(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_is_three_triples() {
        let pattern = AlarmPattern::default();
        assert_eq!(pattern.steps.len(), 9);
        assert_eq!(pattern.total_duration(), Duration::from_millis(3 * (600 + 1000)));
    }

    #[test]
    fn render_length_matches_duration() {
        let pattern = AlarmPattern::default();
        let buf = pattern.render(SAMPLE_RATE);
        assert_eq!(buf.len(), SAMPLE_RATE as usize * 48 / 10);
    }

    #[test]
    fn gaps_are_silent_and_tones_are_not() {
        let pattern = AlarmPattern {
            frequency_hz: 1000.0,
            steps: vec![(Duration::from_millis(10), Duration::from_millis(10))],
        };
        let buf = pattern.render(1000 * 10);
        let (tone, gap) = buf.samples().split_at(100);
        assert!(tone.iter().any(|&s| s.abs() > 10_000));
        assert!(gap.iter().all(|&s| s == 0));
    }
}
