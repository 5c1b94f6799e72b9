//! Configuration for record export
//!
//! Every option is optional and falls back to a documented default. The
//! serializable options can be loaded from JSON, YAML or TOML; formatters and
//! the error callback are code and can only be set through the builder.

use crate::export::ExportError;
use crate::writer::{DEFAULT_CONTENT_TYPE, DEFAULT_DELIMITER, EscapeRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error returned by a caller-supplied formatter
pub type FormatterError = Box<dyn std::error::Error + Send + Sync>;

/// Per-column value transform applied before a value is written
pub type Formatter = Arc<dyn Fn(&Value) -> Result<Value, FormatterError> + Send + Sync>;

/// Callback invoked with the error when a download fails
pub type ErrorCallback = Arc<dyn Fn(&ExportError) + Send + Sync>;

/// Configuration for an export
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Explicit column order; derived from the first record when absent
    pub columns: Option<Vec<String>>,

    /// Content type of the produced artifact
    pub content_type: String,

    /// Cell separator
    #[serde(alias = "delimeter")]
    pub delimiter: String,

    /// Column name -> formatter
    #[serde(skip)]
    pub formatters: HashMap<String, Formatter>,

    /// Column name -> label used in the header row
    pub headers: HashMap<String, String>,

    /// Emit a header row before the data rows
    pub include_headers: bool,

    /// Download filename; `export-<unix-seconds>.csv` when absent
    pub filename: Option<String>,

    /// Called with the error when a download fails
    #[serde(skip)]
    pub on_error: Option<ErrorCallback>,

    /// Log download failures
    pub dev_mode: bool,

    /// When cells get quoted
    pub escape_rule: EscapeRule,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            columns: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            formatters: HashMap::new(),
            headers: HashMap::new(),
            include_headers: true,
            filename: None,
            on_error: None,
            dev_mode: false,
            escape_rule: EscapeRule::default(),
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter_columns: Vec<&String> = self.formatters.keys().collect();
        formatter_columns.sort();

        f.debug_struct("ExportConfig")
            .field("columns", &self.columns)
            .field("content_type", &self.content_type)
            .field("delimiter", &self.delimiter)
            .field("formatters", &formatter_columns)
            .field("headers", &self.headers)
            .field("include_headers", &self.include_headers)
            .field("filename", &self.filename)
            .field("on_error", &self.on_error.is_some())
            .field("dev_mode", &self.dev_mode)
            .field("escape_rule", &self.escape_rule)
            .finish()
    }
}

impl ExportConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Load the serializable options from JSON
    pub fn from_json_str(content: &str) -> Result<Self, ExportError> {
        serde_json::from_str(content)
            .map_err(|e| ExportError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Load the serializable options from YAML
    pub fn from_yaml_str(content: &str) -> Result<Self, ExportError> {
        serde_yaml::from_str(content)
            .map_err(|e| ExportError::InvalidConfig(format!("Failed to parse YAML: {}", e)))
    }

    /// Load the serializable options from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ExportError> {
        toml::from_str(content)
            .map_err(|e| ExportError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    /// Delimiter to write with; an empty value means the default
    pub fn resolved_delimiter(&self) -> &str {
        non_empty_or(&self.delimiter, DEFAULT_DELIMITER)
    }

    /// Content type to tag artifacts with; an empty value means the default
    pub fn resolved_content_type(&self) -> &str {
        non_empty_or(&self.content_type, DEFAULT_CONTENT_TYPE)
    }

    /// Header label for a column
    pub fn header_label<'a>(&'a self, column: &'a str) -> &'a str {
        match self.headers.get(column) {
            Some(label) if !label.is_empty() => label,
            _ => column,
        }
    }

    /// Formatter registered for a column, if any
    pub fn formatter(&self, column: &str) -> Option<&Formatter> {
        self.formatters.get(column)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Builder for ExportConfig
#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Set an explicit column order
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the artifact content type
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.content_type = content_type.into();
        self
    }

    /// Set the cell separator
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    /// Register an infallible formatter for a column
    pub fn formatter<F>(self, column: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.try_formatter(column, move |value| Ok(formatter(value)))
    }

    /// Register a formatter that may fail; its error aborts the export
    pub fn try_formatter<F>(mut self, column: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, FormatterError> + Send + Sync + 'static,
    {
        self.config
            .formatters
            .insert(column.into(), Arc::new(formatter));
        self
    }

    /// Set the header label for a column
    pub fn header(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.headers.insert(column.into(), label.into());
        self
    }

    /// Enable or disable the header row
    pub fn include_headers(mut self, include: bool) -> Self {
        self.config.include_headers = include;
        self
    }

    /// Set the download filename
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.config.filename = Some(filename.into());
        self
    }

    /// Set the callback invoked when a download fails
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ExportError) + Send + Sync + 'static,
    {
        self.config.on_error = Some(Arc::new(callback));
        self
    }

    /// Enable or disable logging of download failures
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set the escaping rule
    pub fn escape_rule(mut self, escape_rule: EscapeRule) -> Self {
        self.config.escape_rule = escape_rule;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExportConfig {
        self.config
    }
}
