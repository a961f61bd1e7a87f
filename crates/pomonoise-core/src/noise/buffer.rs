//! Immutable mono PCM buffers and their on-disk WAV form.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Sample rate of every generated buffer.
pub const SAMPLE_RATE: u32 = 44_100;
/// Length of a generated noise loop.
pub const DURATION_SECS: u32 = 5;
/// Clamp limit, kept below `i16::MAX` for headroom.
pub const SAMPLE_LIMIT: f64 = 32_000.0;

const BITS_PER_SAMPLE: u16 = 16;

/// Mono 16-bit PCM samples. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        1
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Little-endian PCM bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Write as a 16-bit mono WAV file.
    ///
    /// The data goes to a sibling temp file first and is renamed into place,
    /// so a crash mid-write never leaves a truncated buffer at `path`.
    pub fn write_wav(&self, path: &Path) -> Result<(), CacheError> {
        let tmp = tmp_path(path);
        let wav_err = |source| CacheError::Wav {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = hound::WavWriter::create(&tmp, self.wav_spec()).map_err(wav_err)?;
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(wav_err)?;
        }
        writer.finalize().map_err(wav_err)?;

        fs::rename(&tmp, path).map_err(|e| CacheError::Wav {
            path: path.to_path_buf(),
            source: hound::Error::IoError(e),
        })
    }

    /// Read a WAV file written by [`write_wav`](Self::write_wav).
    pub fn read_wav(path: &Path) -> Result<Self, CacheError> {
        let wav_err = |source| CacheError::Wav {
            path: path.to_path_buf(),
            source,
        };

        let reader = hound::WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();
        if spec.channels != 1
            || spec.bits_per_sample != BITS_PER_SAMPLE
            || spec.sample_format != hound::SampleFormat::Int
        {
            return Err(CacheError::Format {
                path: path.to_path_buf(),
                message: format!(
                    "expected mono 16-bit PCM, found {} ch / {} bit / {:?}",
                    spec.channels, spec.bits_per_sample, spec.sample_format
                ),
            });
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(wav_err)?;
        Ok(Self::new(samples, spec.sample_rate))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_roundtrip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.wav");
        let buf = SampleBuffer::new(vec![0, 1, -1, 32000, -32000, 12345, -4321], SAMPLE_RATE);

        buf.write_wav(&path).unwrap();
        let back = SampleBuffer::read_wav(&path).unwrap();

        assert_eq!(back, buf);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn read_rejects_stereo_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(&path, spec).unwrap();
        w.write_sample(0i16).unwrap();
        w.write_sample(0i16).unwrap();
        w.finalize().unwrap();

        assert!(matches!(
            SampleBuffer::read_wav(&path),
            Err(CacheError::Format { .. })
        ));
    }

    #[test]
    fn le_bytes_match_samples() {
        let buf = SampleBuffer::new(vec![1, -2], SAMPLE_RATE);
        assert_eq!(buf.to_le_bytes(), vec![0x01, 0x00, 0xfe, 0xff]);
    }

    #[test]
    fn duration_from_length() {
        let buf = SampleBuffer::new(vec![0; (SAMPLE_RATE * 2) as usize], SAMPLE_RATE);
        assert_eq!(buf.duration_secs(), 2.0);
    }
}
