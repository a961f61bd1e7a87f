//! Looped noise playback with a live gain.
//!
//! Device failures never escape this module: they are logged and playback
//! stays stopped.

use std::sync::Arc;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use super::output::AudioOutput;
use crate::noise::{NoiseCache, NoiseColor};

pub const DEFAULT_GAIN: f32 = 0.5;

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub color: Option<NoiseColor>,
    pub gain: f32,
    pub is_looping: bool,
}

pub struct PlaybackController<O: AudioOutput> {
    output: O,
    cache: Arc<NoiseCache>,
    color: Option<NoiseColor>,
    gain: f32,
    is_looping: bool,
    /// Color whose last `start_loop` failed. Cleared by `set_color`/`stop`.
    failed: Option<NoiseColor>,
    prefetching: [Option<JoinHandle<()>>; 3],
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O, cache: Arc<NoiseCache>) -> Self {
        Self {
            output,
            cache,
            color: None,
            gain: DEFAULT_GAIN,
            is_looping: false,
            failed: None,
            prefetching: Default::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            color: self.color,
            gain: self.gain,
            is_looping: self.is_looping,
        }
    }

    pub fn color(&self) -> Option<NoiseColor> {
        self.color
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn cache(&self) -> &Arc<NoiseCache> {
        &self.cache
    }

    /// Select a color (or none). A running loop is swapped for the new color;
    /// selecting none stops playback.
    pub fn set_color(&mut self, color: Option<NoiseColor>) {
        if self.color == color {
            return;
        }
        self.color = color;
        self.failed = None;
        self.prepare();
        if self.is_looping {
            self.stop();
            self.play();
        }
    }

    /// Set the gain, clamped to `[0, 1]`. NaN counts as silence.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        if self.is_looping {
            self.output.set_gain(self.gain);
        }
    }

    /// Start looping the selected color.
    ///
    /// No-op when nothing is selected, when already looping, or when the
    /// buffer is still being produced (a background prefetch is kicked off).
    /// After a device failure the same color isn't retried until the color
    /// changes or playback is stopped.
    pub fn play(&mut self) {
        if self.is_looping {
            return;
        }
        let Some(color) = self.color else {
            return;
        };
        if self.failed == Some(color) {
            return;
        }
        let Some(buffer) = self.cache.get(color) else {
            tracing::debug!(%color, "noise buffer not ready yet");
            self.prepare();
            return;
        };
        match self.output.start_loop(buffer, self.gain) {
            Ok(()) => {
                tracing::debug!(%color, gain = self.gain, "noise playback started");
                self.is_looping = true;
            }
            Err(e) => {
                tracing::warn!(%color, error = %e, "noise playback unavailable");
                self.failed = Some(color);
            }
        }
    }

    /// Halt playback. Idempotent.
    pub fn stop(&mut self) {
        self.failed = None;
        if !self.is_looping {
            return;
        }
        self.output.stop();
        self.is_looping = false;
        tracing::debug!("noise playback stopped");
    }

    /// Make sure the selected color's buffer is being produced off-thread.
    pub fn prepare(&mut self) {
        let Some(color) = self.color else {
            return;
        };
        if self.cache.get(color).is_some() {
            return;
        }
        let slot = &mut self.prefetching[color.index()];
        match slot.take() {
            Some(handle) if !handle.is_finished() => {
                *slot = Some(handle);
                return;
            }
            // Finished without filling the cache slot.
            Some(handle) => {
                if handle.join().is_err() {
                    tracing::warn!(%color, "noise prefetch thread panicked, retrying");
                }
            }
            None => {}
        }
        *slot = Some(self.cache.prefetch(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::noise::SampleBuffer;

    #[derive(Default)]
    struct FakeOutput {
        starts: Vec<usize>,
        stops: usize,
        gains: Vec<f32>,
        attempts: usize,
        fail: bool,
    }

    impl AudioOutput for FakeOutput {
        fn start_loop(&mut self, buffer: Arc<SampleBuffer>, gain: f32) -> Result<(), AudioError> {
            self.attempts += 1;
            if self.fail {
                return Err(AudioError::NoDevice);
            }
            self.starts.push(buffer.len());
            self.gains.push(gain);
            Ok(())
        }

        fn set_gain(&mut self, gain: f32) {
            self.gains.push(gain);
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    fn warm_controller() -> PlaybackController<FakeOutput> {
        let cache = Arc::new(NoiseCache::in_memory());
        for color in NoiseColor::ALL {
            cache.get_or_create(color);
        }
        PlaybackController::new(FakeOutput::default(), cache)
    }

    #[test]
    fn play_without_color_is_noop() {
        let mut pc = warm_controller();
        pc.play();
        assert!(!pc.is_looping());
        assert!(pc.output().starts.is_empty());
    }

    #[test]
    fn play_and_stop() {
        let mut pc = warm_controller();
        pc.set_color(Some(NoiseColor::Pink));
        assert!(pc.output().starts.is_empty());

        pc.play();
        assert!(pc.is_looping());
        assert_eq!(pc.output().starts, vec![220_500]);

        pc.stop();
        pc.stop();
        assert!(!pc.is_looping());
        assert_eq!(pc.output().stops, 1);
    }

    #[test]
    fn color_change_while_playing_swaps_loop() {
        let mut pc = warm_controller();
        pc.set_color(Some(NoiseColor::White));
        pc.play();
        pc.set_color(Some(NoiseColor::Brown));

        assert!(pc.is_looping());
        assert_eq!(pc.output().starts.len(), 2);
        assert_eq!(pc.output().stops, 1);
    }

    #[test]
    fn selecting_none_stops_playback() {
        let mut pc = warm_controller();
        pc.set_color(Some(NoiseColor::White));
        pc.play();
        pc.set_color(None);

        assert!(!pc.is_looping());
        assert_eq!(pc.output().stops, 1);
        assert_eq!(pc.output().starts.len(), 1);
    }

    #[test]
    fn gain_is_clamped_and_applied_live() {
        let mut pc = warm_controller();
        pc.set_gain(1.7);
        assert_eq!(pc.gain(), 1.0);
        pc.set_gain(-0.2);
        assert_eq!(pc.gain(), 0.0);
        pc.set_gain(f32::NAN);
        assert_eq!(pc.gain(), 0.0);
        assert!(pc.output().gains.is_empty());

        pc.set_color(Some(NoiseColor::Pink));
        pc.set_gain(0.3);
        pc.play();
        pc.set_gain(0.8);
        assert_eq!(pc.output().gains, vec![0.3, 0.8]);
    }

    #[test]
    fn device_failure_is_silent() {
        let mut pc = warm_controller();
        pc.output.fail = true;
        pc.set_color(Some(NoiseColor::Pink));
        pc.play();
        assert!(!pc.is_looping());
        pc.stop();
        assert_eq!(pc.output().stops, 0);
    }

    #[test]
    fn failed_device_is_not_retried_until_stop_or_color_change() {
        let mut pc = warm_controller();
        pc.output.fail = true;
        pc.set_color(Some(NoiseColor::Pink));
        for _ in 0..5 {
            pc.play();
        }
        assert_eq!(pc.output().attempts, 1);

        pc.set_color(Some(NoiseColor::White));
        pc.play();
        pc.play();
        assert_eq!(pc.output().attempts, 2);

        pc.stop();
        pc.output.fail = false;
        pc.play();
        assert!(pc.is_looping());
        assert_eq!(pc.output().attempts, 3);
    }

    #[test]
    fn dead_prefetch_is_restarted() {
        let cache = Arc::new(NoiseCache::in_memory());
        let mut pc = PlaybackController::new(FakeOutput::default(), Arc::clone(&cache));
        let dead = std::thread::spawn(|| {});
        while !dead.is_finished() {
            std::thread::yield_now();
        }
        pc.prefetching[NoiseColor::White.index()] = Some(dead);

        pc.set_color(Some(NoiseColor::White));
        let handle = pc.prefetching[NoiseColor::White.index()]
            .take()
            .expect("prefetch restarted");
        handle.join().unwrap();
        assert!(cache.get(NoiseColor::White).is_some());
    }

    #[test]
    fn missing_buffer_defers_playback() {
        let cache = Arc::new(NoiseCache::in_memory());
        let mut pc = PlaybackController::new(FakeOutput::default(), Arc::clone(&cache));
        pc.set_color(Some(NoiseColor::Brown));
        pc.play();
        // Either still synthesizing (no-op) or already done; never panics.
        if !pc.is_looping() {
            assert!(pc.output().starts.is_empty());
        }
        cache.get_or_create(NoiseColor::Brown);
        pc.play();
        assert!(pc.is_looping());
    }
}
