//! DSV Export - delimiter-separated export of uniform records
//!
//! Provides unified interfaces for:
//! - Writing escaped cells and rows (writer)
//! - Resolving export options (config)
//! - Building text or artifacts from records (export)
//! - Handing artifacts to the host as downloads (storage)

pub mod config;
pub mod export;
pub mod storage;
pub mod writer;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ErrorCallback, ExportConfig, ExportConfigBuilder, Formatter, FormatterError};
pub use export::{
    CsvExporter, DownloadOutcome, ExportError, ExportOutput, OutputKind, Record,
};
pub use storage::{DownloadSink, FileSystemSink, MemorySink, SavedDownload, SinkError};
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use storage::BrowserDownloadSink;
pub use writer::{Artifact, DsvWriter, EscapeRule, sanitize_value};
