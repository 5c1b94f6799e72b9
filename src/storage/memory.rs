//! In-memory download sink
//!
//! Records every saved artifact. Useful for tests and for hosts that want to
//! pick the bytes up themselves.

use super::{DownloadSink, SinkError};
use crate::writer::Artifact;
use std::sync::{Mutex, MutexGuard};

/// A download captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub filename: String,
    pub artifact: Artifact,
}

/// Download sink that keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<SavedDownload>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SavedDownload>> {
        self.downloads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All downloads so far, oldest first
    pub fn downloads(&self) -> Vec<SavedDownload> {
        self.lock().clone()
    }

    /// The most recent download
    pub fn last(&self) -> Option<SavedDownload> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, artifact: &Artifact, filename: &str) -> Result<(), SinkError> {
        self.lock().push(SavedDownload {
            filename: filename.to_string(),
            artifact: artifact.clone(),
        });
        Ok(())
    }
}
