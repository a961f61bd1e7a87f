//! Generate-once storage for noise buffers.
//!
//! Each color gets one slot. The first request fills it by loading
//! `<dir>/<color>.wav`, or by synthesizing and writing that file when it is
//! absent. Later requests return the same `Arc`. An existing file is never
//! overwritten; there is no expiry or versioning.
//!
//! IO failures never reach the caller: a buffer that cannot be loaded or
//! persisted is synthesized in memory and simply won't be reused next run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use super::buffer::SampleBuffer;
use super::color::NoiseColor;
use super::synth::synthesize;
use crate::error::CacheError;

#[derive(Debug, Default)]
pub struct NoiseCache {
    dir: Option<PathBuf>,
    slots: [OnceLock<Arc<SampleBuffer>>; 3],
}

impl NoiseCache {
    /// Cache persisting under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            slots: Default::default(),
        }
    }

    /// Cache that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache under `<data_dir>/noise`, or in-memory if the data directory
    /// is unavailable.
    pub fn open_default() -> Self {
        match crate::storage::data_dir() {
            Ok(dir) => Self::new(dir.join("noise")),
            Err(e) => {
                tracing::warn!(error = %e, "noise cache falling back to memory");
                Self::in_memory()
            }
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Persisted location for `color`, if this cache persists at all.
    pub fn path_for(&self, color: NoiseColor) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|d| d.join(format!("{}.wav", color.name())))
    }

    /// The buffer for `color` if it has already been produced.
    pub fn get(&self, color: NoiseColor) -> Option<Arc<SampleBuffer>> {
        self.slots[color.index()].get().cloned()
    }

    /// The buffer for `color`, producing it on first use.
    ///
    /// Concurrent first calls block until the single producer finishes.
    pub fn get_or_create(&self, color: NoiseColor) -> Arc<SampleBuffer> {
        self.slots[color.index()]
            .get_or_init(|| Arc::new(self.load_or_synthesize(color)))
            .clone()
    }

    /// Produce `color` on a background thread.
    pub fn prefetch(self: &Arc<Self>, color: NoiseColor) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        std::thread::spawn(move || {
            cache.get_or_create(color);
        })
    }

    /// Drop the in-memory buffer for `color` and delete its persisted file,
    /// so the next request synthesizes a fresh one.
    pub fn invalidate(&mut self, color: NoiseColor) {
        self.slots[color.index()].take();
        if let Some(path) = self.path_for(color) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::info!(%color, path = %path.display(), "noise buffer invalidated"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(%color, error = %e, "failed to remove noise buffer"),
            }
        }
    }

    fn load_or_synthesize(&self, color: NoiseColor) -> SampleBuffer {
        let Some(path) = self.path_for(color) else {
            tracing::debug!(%color, "synthesizing in-memory noise buffer");
            return synthesize(color);
        };

        if path.exists() {
            match SampleBuffer::read_wav(&path) {
                Ok(buffer) => {
                    tracing::debug!(%color, path = %path.display(), "loaded cached noise buffer");
                    return buffer;
                }
                Err(e) => {
                    tracing::warn!(%color, error = %e, "cached noise buffer unreadable, using memory only");
                    return synthesize(color);
                }
            }
        }

        tracing::info!(%color, "synthesizing noise buffer");
        let buffer = synthesize(color);
        if let Err(e) = self.persist(&path, &buffer) {
            tracing::warn!(%color, error = %e, "failed to persist noise buffer");
        }
        buffer
    }

    fn persist(&self, path: &Path, buffer: &SampleBuffer) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        buffer.write_wav(path)
    }
}
