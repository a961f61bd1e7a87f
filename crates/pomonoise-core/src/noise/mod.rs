//! Colored-noise beds: synthesis, PCM buffers and the generate-once cache.

mod buffer;
mod cache;
mod color;
mod synth;

pub use buffer::{SampleBuffer, DURATION_SECS, SAMPLE_LIMIT, SAMPLE_RATE};
pub use cache::NoiseCache;
pub use color::{parse_selection, NoiseColor, ParseColorError};
pub use synth::{synthesize, synthesize_with, BrownFilter, NoiseFilter, PinkFilter, WhiteFilter};
