//! Download sink abstraction
//!
//! Defines the DownloadSink trait and implementations for different hosts:
//! - MemorySink: keeps downloads in memory (tests, embedding)
//! - FileSystemSink: writes downloads into a directory (native apps, CLI)
//! - BrowserDownloadSink: triggers a browser file download (WASM apps)

use crate::writer::Artifact;

/// Error type for download sinks
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Download mechanism unavailable: {0}")]
    Unavailable(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Download sink error: {0}")]
    BackendError(String),
}

/// Host capability that saves an artifact as a file on the user's device.
///
/// Implementations report whether the host accepted the artifact; nothing
/// beyond that is signalled back.
pub trait DownloadSink: Send + Sync {
    /// Save `artifact` under `filename`
    fn save(&self, artifact: &Artifact, filename: &str) -> Result<(), SinkError>;
}

pub mod filesystem;
pub mod memory;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod browser;

pub use filesystem::FileSystemSink;
pub use memory::{MemorySink, SavedDownload};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use browser::BrowserDownloadSink;
