//! CSV exporter for uniform records.
//!
//! Resolves columns, header labels and formatters from an [`ExportConfig`],
//! drives a [`DsvWriter`] row by row and returns text, an artifact, or hands
//! the artifact to a download sink.

use crate::config::ExportConfig;
use crate::export::{DownloadOutcome, ExportError, ExportOutput, OutputKind};
use crate::storage::DownloadSink;
use crate::writer::{Artifact, DsvWriter};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::{debug, error, info};

/// One record: column name -> value, in insertion order
pub type Record = Map<String, Value>;

/// Exporter for delimiter-separated files.
///
/// # Example
///
/// ```rust
/// use dsv_export::config::ExportConfig;
/// use dsv_export::export::CsvExporter;
/// use serde_json::json;
///
/// let records = vec![
///     json!({"name": "Al", "age": 30}).as_object().unwrap().clone(),
///     json!({"name": "\"Bo\"", "age": 7}).as_object().unwrap().clone(),
/// ];
///
/// let exporter = CsvExporter::new(ExportConfig::default());
/// let text = exporter.export_as_text(&records).unwrap();
/// assert_eq!(text, "name,age\r\nAl,30\r\n\"\"\"Bo\"\"\",7");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: ExportConfig,
}

impl CsvExporter {
    /// Create an exporter bound to a configuration
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Shorthand for [`CsvExporter::new`]
    pub fn create(config: ExportConfig) -> Self {
        Self::new(config)
    }

    /// One-shot download with a throwaway exporter
    pub fn download<S>(records: &[Record], config: ExportConfig, sink: &S) -> DownloadOutcome
    where
        S: DownloadSink + ?Sized,
    {
        Self::new(config).trigger_download(records, sink)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the document and return it as text or as an artifact.
    ///
    /// # Errors
    ///
    /// - [`ExportError::EmptyInput`] when `records` is empty and no columns are configured
    /// - [`ExportError::Formatter`] when a formatter fails
    pub fn build_document(
        &self,
        records: &[Record],
        kind: OutputKind,
    ) -> Result<ExportOutput, ExportError> {
        let writer = self.write_document(records)?;
        Ok(match kind {
            OutputKind::Text => ExportOutput::Text(writer.to_text()),
            OutputKind::Artifact => ExportOutput::Artifact(writer.to_artifact()),
        })
    }

    /// Same as `build_document(records, OutputKind::Artifact)`
    pub fn export_as_artifact(&self, records: &[Record]) -> Result<Artifact, ExportError> {
        Ok(self.write_document(records)?.to_artifact())
    }

    /// Same as `build_document(records, OutputKind::Text)`
    pub fn export_as_text(&self, records: &[Record]) -> Result<String, ExportError> {
        Ok(self.write_document(records)?.to_text())
    }

    /// Build the artifact and hand it to `sink`.
    ///
    /// Failures never propagate: they are passed to the `on_error` callback,
    /// logged when `dev_mode` is set, and returned as
    /// [`DownloadOutcome::Failed`].
    pub fn trigger_download<S>(&self, records: &[Record], sink: &S) -> DownloadOutcome
    where
        S: DownloadSink + ?Sized,
    {
        let filename = self.resolve_filename();
        match self.save_artifact(records, sink, &filename) {
            Ok(bytes) => {
                info!("Downloaded {} ({} bytes)", filename, bytes);
                DownloadOutcome::Saved { filename, bytes }
            }
            Err(err) => {
                self.report_failure(&err);
                DownloadOutcome::Failed(err)
            }
        }
    }

    fn save_artifact<S>(
        &self,
        records: &[Record],
        sink: &S,
        filename: &str,
    ) -> Result<usize, ExportError>
    where
        S: DownloadSink + ?Sized,
    {
        let artifact = self.export_as_artifact(records)?;
        sink.save(&artifact, filename)?;
        Ok(artifact.len())
    }

    fn report_failure(&self, err: &ExportError) {
        if self.config.dev_mode {
            error!(
                "Error downloading CSV. Send this log to the developers: {}",
                err
            );
        }
        if let Some(callback) = &self.config.on_error {
            callback(err);
        }
    }

    /// Configured filename, else `export-<unix-seconds>.csv`
    pub fn resolve_filename(&self) -> String {
        match self.config.filename.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_filename(),
        }
    }

    /// Explicit columns, else the key order of the first record
    fn resolve_columns<'a>(
        &'a self,
        records: &'a [Record],
    ) -> Result<Cow<'a, [String]>, ExportError> {
        if let Some(columns) = &self.config.columns {
            return Ok(Cow::Borrowed(columns.as_slice()));
        }
        let first = records.first().ok_or(ExportError::EmptyInput)?;
        Ok(Cow::Owned(first.keys().cloned().collect()))
    }

    fn write_document(&self, records: &[Record]) -> Result<DsvWriter, ExportError> {
        let columns = self.resolve_columns(records)?;
        let mut writer = DsvWriter::new(
            self.config.resolved_delimiter(),
            self.config.resolved_content_type(),
        )
        .with_escape_rule(self.config.escape_rule);

        if self.config.include_headers {
            for column in columns.iter() {
                writer.write_str(self.config.header_label(column));
            }
            writer.write_line();
        }

        let missing = Value::Null;
        for record in records {
            for column in columns.iter() {
                match self.config.formatter(column) {
                    Some(formatter) => {
                        let value = record.get(column).unwrap_or(&missing);
                        let formatted =
                            formatter(value).map_err(|source| ExportError::Formatter {
                                column: column.clone(),
                                source,
                            })?;
                        writer.write_value(Some(&formatted));
                    }
                    None => writer.write_value(record.get(column)),
                }
            }
            writer.write_line();
        }

        debug!(
            "Built document with {} column(s) and {} row(s)",
            columns.len(),
            writer.row_count()
        );
        Ok(writer)
    }
}

fn default_filename() -> String {
    format!("export-{}.csv", chrono::Utc::now().timestamp())
}
