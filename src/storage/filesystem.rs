//! File system download sink
//!
//! Saves downloads as files inside a base directory.
//! Used by native apps and the command line tool.
//!
//! ## Security
//!
//! Filenames are validated to prevent path traversal attacks.
//! Names containing ".." are rejected, and all resolved paths are verified
//! to remain within the base directory.

use super::{DownloadSink, SinkError};
use crate::writer::Artifact;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File system download sink
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    base_path: PathBuf,
}

impl FileSystemSink {
    /// Create a new file system sink
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory that receives all downloads
    ///
    /// # Example
    ///
    /// ```rust
    /// use dsv_export::storage::FileSystemSink;
    ///
    /// let sink = FileSystemSink::new("/tmp/downloads");
    /// assert_eq!(sink.base_path().to_str(), Some("/tmp/downloads"));
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a filename relative to the base path with security checks.
    ///
    /// - Rejects names containing ".." components
    /// - Verifies the resolved path stays within base_path
    fn resolve_path(&self, filename: &str) -> Result<PathBuf, SinkError> {
        let normalized = filename.trim_start_matches('/');

        if normalized.is_empty() {
            return Err(SinkError::PermissionDenied(
                "Empty filename not allowed".to_string(),
            ));
        }

        if normalized.contains("..") {
            return Err(SinkError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }

        let full = self.base_path.join(normalized);

        for component in full.components() {
            if matches!(component, Component::ParentDir) {
                return Err(SinkError::PermissionDenied(
                    "Path traversal not allowed".to_string(),
                ));
            }
        }

        // An existing parent must not lead outside the base directory (symlinks)
        if let Some(parent) = full.parent()
            && parent.exists()
        {
            let parent_canonical = parent.canonicalize().map_err(|e| {
                SinkError::IoError(format!("Failed to resolve parent path: {}", e))
            })?;

            let base_canonical = self
                .base_path
                .canonicalize()
                .unwrap_or_else(|_| self.base_path.clone());

            if !parent_canonical.starts_with(&base_canonical) {
                return Err(SinkError::PermissionDenied(
                    "Path escapes base directory".to_string(),
                ));
            }
        }

        Ok(full)
    }
}

impl DownloadSink for FileSystemSink {
    fn save(&self, artifact: &Artifact, filename: &str) -> Result<(), SinkError> {
        let full_path = self.resolve_path(filename)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SinkError::IoError(format!(
                    "Failed to create directory for {}: {}",
                    filename, e
                ))
            })?;
        }

        fs::write(&full_path, artifact.bytes()).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                SinkError::PermissionDenied(format!("Cannot write {}: {}", filename, e))
            }
            _ => SinkError::IoError(format!("Failed to write file {}: {}", filename, e)),
        })?;

        debug!(
            "Wrote {} bytes ({}) to {}",
            artifact.len(),
            artifact.content_type(),
            full_path.display()
        );
        Ok(())
    }
}
