//! Colored-noise synthesis.
//!
//! Each color is a recurrence over one uniform value `w` in `[-1, 1]` per
//! sample. Output is scaled to the i16 range and clamped to
//! `±SAMPLE_LIMIT`.
//!
//! ## Filters
//!
//! - White: `w` scaled directly.
//! - Brown: leaky integrator `last = (last + 0.02 w) / 1.02`.
//! - Pink: Paul Kellet's refined seven-pole approximation of a -3 dB/octave
//!   slope. `b6` is updated after the sum, so each sample sees the previous
//!   `b6`.

use rand::Rng;

use super::buffer::{SampleBuffer, DURATION_SECS, SAMPLE_LIMIT, SAMPLE_RATE};
use super::color::NoiseColor;

const WHITE_GAIN: f64 = 3000.0;
const BROWN_GAIN: f64 = 2000.0 * 30.0;
const PINK_GAIN: f64 = 0.11 * 3000.0 * 5.0;

/// One step of a noise recurrence.
pub trait NoiseFilter {
    /// Consume one uniform input and return the unclamped sample value.
    fn next_sample(&mut self, w: f64) -> f64;
}

#[derive(Debug, Default, Clone)]
pub struct WhiteFilter;

impl NoiseFilter for WhiteFilter {
    fn next_sample(&mut self, w: f64) -> f64 {
        w * WHITE_GAIN
    }
}

#[derive(Debug, Default, Clone)]
pub struct BrownFilter {
    last: f64,
}

impl NoiseFilter for BrownFilter {
    fn next_sample(&mut self, w: f64) -> f64 {
        self.last = (self.last + 0.02 * w) / 1.02;
        self.last * BROWN_GAIN
    }
}

#[derive(Debug, Default, Clone)]
pub struct PinkFilter {
    b: [f64; 7],
}

impl NoiseFilter for PinkFilter {
    fn next_sample(&mut self, w: f64) -> f64 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + w * 0.0555179;
        b[1] = 0.99332 * b[1] + w * 0.0750759;
        b[2] = 0.96900 * b[2] + w * 0.1538520;
        b[3] = 0.86650 * b[3] + w * 0.3104856;
        b[4] = 0.55000 * b[4] + w * 0.5329522;
        b[5] = -0.7616 * b[5] - w * 0.0168980;
        let sum = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + w * 0.5362;
        b[6] = w * 0.115926;
        sum * PINK_GAIN
    }
}

fn to_pcm(value: f64) -> i16 {
    // `as` truncates toward zero; the clamp keeps it inside i16 anyway.
    value.clamp(-SAMPLE_LIMIT, SAMPLE_LIMIT) as i16
}

fn render<F: NoiseFilter, R: Rng + ?Sized>(filter: F, count: usize, rng: &mut R) -> Vec<i16> {
    render_inputs(filter, (0..count).map(|_| rng.gen_range(-1.0..=1.0)))
}

/// Run `filter` over an explicit input stream.
fn render_inputs<F: NoiseFilter>(mut filter: F, inputs: impl Iterator<Item = f64>) -> Vec<i16> {
    inputs.map(|w| to_pcm(filter.next_sample(w))).collect()
}

/// Synthesize `duration_secs` of `color` noise at `sample_rate` from `rng`.
///
/// Deterministic for a given random stream.
pub fn synthesize_with<R: Rng + ?Sized>(
    color: NoiseColor,
    duration_secs: u32,
    sample_rate: u32,
    rng: &mut R,
) -> SampleBuffer {
    let count = duration_secs as usize * sample_rate as usize;
    let samples = match color {
        NoiseColor::White => render(WhiteFilter, count, rng),
        NoiseColor::Pink => render(PinkFilter::default(), count, rng),
        NoiseColor::Brown => render(BrownFilter::default(), count, rng),
    };
    SampleBuffer::new(samples, sample_rate)
}

/// Synthesize the standard five-second 44.1 kHz loop for `color`.
pub fn synthesize(color: NoiseColor) -> SampleBuffer {
    synthesize_with(color, DURATION_SECS, SAMPLE_RATE, &mut rand::thread_rng())
}
