//! Error type for the command line tool

use crate::export::ExportError;
use std::path::PathBuf;

/// Errors reported by the dsv-export binary
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Failed to write output: {0}")]
    WriteError(String),
}
