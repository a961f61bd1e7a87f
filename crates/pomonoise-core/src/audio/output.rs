//! Host audio output.
//!
//! [`AudioOutput`] is the seam between playback logic and the device. The
//! cpal implementation opens the default output device, resamples the mono
//! buffer by nearest-sample stepping and copies it to every channel.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::error::AudioError;
use crate::noise::SampleBuffer;

pub trait AudioOutput {
    /// Begin looping `buffer` at `gain`, replacing anything already playing.
    fn start_loop(&mut self, buffer: Arc<SampleBuffer>, gain: f32) -> Result<(), AudioError>;

    /// Change the gain of whatever is playing.
    fn set_gain(&mut self, gain: f32);

    /// Halt playback. Safe when nothing is playing.
    fn stop(&mut self);
}

/// Gain shared with the audio callback, stored as f32 bits.
#[derive(Debug, Clone)]
pub(crate) struct SharedGain(Arc<AtomicU32>);

impl SharedGain {
    pub(crate) fn new(gain: f32) -> Self {
        Self(Arc::new(AtomicU32::new(gain.to_bits())))
    }

    pub(crate) fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, gain: f32) {
        self.0.store(gain.to_bits(), Ordering::Relaxed);
    }
}

/// Reads a buffer at an arbitrary output rate.
#[derive(Debug)]
pub(crate) struct BufferCursor {
    buffer: Arc<SampleBuffer>,
    position: f64,
    step: f64,
    looping: bool,
    gain: SharedGain,
}

impl BufferCursor {
    pub(crate) fn new(buffer: Arc<SampleBuffer>, output_rate: u32, looping: bool, gain: SharedGain) -> Self {
        let step = if output_rate == 0 {
            1.0
        } else {
            buffer.sample_rate() as f64 / output_rate as f64
        };
        Self {
            buffer,
            position: 0.0,
            step,
            looping,
            gain,
        }
    }

    /// Next output value in `[-1, 1]`. Silence once a one-shot buffer ends.
    pub(crate) fn next_value(&mut self) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }
        if self.position >= len as f64 {
            if !self.looping {
                return 0.0;
            }
            self.position %= len as f64;
        }
        let sample = self.buffer.samples()[self.position as usize];
        self.position += self.step;
        sample as f32 / 32_768.0 * self.gain.get()
    }
}

/// Plays buffers through the default cpal output device.
pub struct CpalOutput {
    stream: Option<Stream>,
    gain: SharedGain,
}

impl CpalOutput {
    pub fn new() -> Self {
        Self {
            stream: None,
            gain: SharedGain::new(0.0),
        }
    }

    /// Play `buffer` once on a fresh stream. The stream stops producing
    /// sound at the end of the buffer and must be kept alive until then.
    pub fn play_once(buffer: Arc<SampleBuffer>, gain: f32) -> Result<Stream, AudioError> {
        open_stream(buffer, SharedGain::new(gain), false)
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for CpalOutput {
    fn start_loop(&mut self, buffer: Arc<SampleBuffer>, gain: f32) -> Result<(), AudioError> {
        self.stop();
        self.gain.set(gain);
        let stream = open_stream(buffer, self.gain.clone(), true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain.set(gain);
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!(error = %e, "pausing stream before drop failed");
            }
        }
    }
}

fn open_stream(buffer: Arc<SampleBuffer>, gain: SharedGain, looping: bool) -> Result<Stream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let supported = device.default_output_config()?;
    let format = supported.sample_format();
    let config: StreamConfig = supported.into();

    tracing::debug!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        rate = config.sample_rate.0,
        channels = config.channels,
        "opening output stream"
    );

    let cursor = BufferCursor::new(buffer, config.sample_rate.0, looping, gain);
    let stream = match format {
        SampleFormat::F32 => build::<f32>(&device, &config, cursor)?,
        SampleFormat::I16 => build::<i16>(&device, &config, cursor)?,
        SampleFormat::U16 => build::<u16>(&device, &config, cursor)?,
        other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
    };
    stream.play()?;
    Ok(stream)
}

fn build<T>(device: &cpal::Device, config: &StreamConfig, mut cursor: BufferCursor) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(cursor.next_value());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        |err| tracing::warn!(error = %err, "audio stream error"),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(samples: Vec<i16>, rate: u32) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::new(samples, rate))
    }

    #[test]
    fn cursor_loops_at_native_rate() {
        let mut cursor = BufferCursor::new(buffer(vec![16384, -16384], 44_100), 44_100, true, SharedGain::new(1.0));
        let values: Vec<f32> = (0..5).map(|_| cursor.next_value()).collect();
        assert_eq!(values, vec![0.5, -0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn cursor_one_shot_ends_in_silence() {
        let mut cursor = BufferCursor::new(buffer(vec![16384], 44_100), 44_100, false, SharedGain::new(1.0));
        assert_eq!(cursor.next_value(), 0.5);
        assert_eq!(cursor.next_value(), 0.0);
        assert_eq!(cursor.next_value(), 0.0);
    }

    #[test]
    fn cursor_steps_for_higher_output_rate() {
        // 2x output rate repeats each source sample twice.
        let mut cursor = BufferCursor::new(buffer(vec![16384, 0], 44_100), 88_200, true, SharedGain::new(1.0));
        let values: Vec<f32> = (0..4).map(|_| cursor.next_value()).collect();
        assert_eq!(values, vec![0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn gain_changes_apply_live() {
        let gain = SharedGain::new(1.0);
        let mut cursor = BufferCursor::new(buffer(vec![16384], 44_100), 44_100, true, gain.clone());
        assert_eq!(cursor.next_value(), 0.5);
        gain.set(0.5);
        assert_eq!(cursor.next_value(), 0.25);
    }

    #[test]
    fn empty_buffer_is_silent() {
        let mut cursor = BufferCursor::new(buffer(vec![], 44_100), 48_000, true, SharedGain::new(1.0));
        assert_eq!(cursor.next_value(), 0.0);
    }
}
