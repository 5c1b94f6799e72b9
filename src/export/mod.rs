//! Export functionality
//!
//! Turns uniform records into a delimiter-separated document:
//! - as text
//! - as a content-type tagged [`Artifact`]
//! - handed to a [`DownloadSink`](crate::storage::DownloadSink)

pub mod csv;

use crate::config::FormatterError;
use crate::storage::SinkError;
use crate::writer::Artifact;

pub use csv::{CsvExporter, Record};

/// Which representation `build_document` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    Text,
    #[default]
    Artifact,
}

/// Result of building a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    Text(String),
    Artifact(Artifact),
}

impl ExportOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportOutput::Text(text) => Some(text),
            ExportOutput::Artifact(_) => None,
        }
    }

    pub fn as_artifact(&self) -> Option<&Artifact> {
        match self {
            ExportOutput::Artifact(artifact) => Some(artifact),
            ExportOutput::Text(_) => None,
        }
    }
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No records to export and no columns configured")]
    EmptyInput,
    #[error("Formatter for column '{column}' failed: {source}")]
    Formatter {
        column: String,
        #[source]
        source: FormatterError,
    },
    #[error("Download failed: {0}")]
    Sink(#[from] SinkError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Outcome of a download request.
///
/// Downloads never return `Err`; a failure has already been reported to the
/// configured error callback (and logged in dev mode) when `Failed` is seen.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The sink accepted the artifact
    Saved { filename: String, bytes: usize },
    /// Building or saving failed
    Failed(ExportError),
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved { .. })
    }

    pub fn error(&self) -> Option<&ExportError> {
        match self {
            DownloadOutcome::Failed(err) => Some(err),
            DownloadOutcome::Saved { .. } => None,
        }
    }
}
