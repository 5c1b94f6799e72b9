//! Delimiter-separated values writer
//!
//! Keeps an in-memory document as a list of rows of already-escaped cells.
//! The document can be serialized to text any number of times, or turned into
//! an [`Artifact`] tagged with the configured content type.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Cell separator used when none is configured
pub const DEFAULT_DELIMITER: &str = ",";
/// Content type used when none is configured
pub const DEFAULT_CONTENT_TYPE: &str = "text/csv";

const ROW_SEPARATOR: &str = "\r\n";
const QUOTE: char = '"';

// Largest integer an f64 holds without losing precision (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rule deciding when a cell gets wrapped in quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeRule {
    /// Quote when the cell contains the delimiter, a quote, CR or LF
    #[default]
    Conventional,
    /// Quote only when the cell contains the delimiter or a quote directly
    /// followed by CRLF. Lone quotes and bare line breaks pass through.
    Legacy,
}

impl EscapeRule {
    /// Whether `value` must be wrapped in quotes under this rule
    pub fn needs_quotes(self, value: &str, delimiter: &str) -> bool {
        if value.contains(delimiter) {
            return true;
        }
        match self {
            EscapeRule::Conventional => value.contains([QUOTE, '\r', '\n']),
            EscapeRule::Legacy => value.contains("\"\r\n"),
        }
    }
}

/// Convert a value to its cell text.
///
/// Absent values (`None`, i.e. a missing key) and `null` become the empty
/// string. Strings are taken verbatim, numbers and booleans use their plain
/// textual form, and arrays/objects are rendered as compact JSON.
///
/// # Example
///
/// ```rust
/// use dsv_export::writer::sanitize_value;
/// use serde_json::json;
///
/// assert_eq!(sanitize_value(None), "");
/// assert_eq!(sanitize_value(Some(&json!(null))), "");
/// assert_eq!(sanitize_value(Some(&json!("Al"))), "Al");
/// assert_eq!(sanitize_value(Some(&json!(30))), "30");
/// ```
pub fn sanitize_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Integral floats print without a fractional part (`6.0` becomes `6`)
fn format_number(n: &Number) -> String {
    if !n.is_i64()
        && !n.is_u64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < MAX_SAFE_INTEGER
    {
        return format!("{}", f as i64);
    }
    n.to_string()
}

/// Wrap `value` in quotes, doubling every quote it contains
fn wrap_with_quotes(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(QUOTE);
    for ch in value.chars() {
        if ch == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(ch);
    }
    quoted.push(QUOTE);
    quoted
}

/// Serialized document as bytes, tagged with a content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
    content_type: String,
}

impl Artifact {
    /// Create an artifact from raw bytes
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The bytes as text, if they are valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// In-memory delimiter-separated document
///
/// A fresh writer holds a single empty row. [`DsvWriter::write_value`] appends
/// a cell to the last row and [`DsvWriter::write_line`] opens a new one.
///
/// # Example
///
/// ```rust
/// use dsv_export::writer::DsvWriter;
/// use serde_json::json;
///
/// let mut writer = DsvWriter::new(";", "text/csv");
/// writer.write_str("name");
/// writer.write_str("city");
/// writer.write_line();
/// writer.write_value(Some(&json!("Al")));
/// writer.write_value(Some(&json!("Köln; Altstadt")));
/// writer.write_line();
///
/// assert_eq!(writer.to_text(), "name;city\r\nAl;\"Köln; Altstadt\"");
/// ```
#[derive(Debug, Clone)]
pub struct DsvWriter {
    delimiter: String,
    content_type: String,
    escape_rule: EscapeRule,
    rows: Vec<Vec<String>>,
}

impl Default for DsvWriter {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, DEFAULT_CONTENT_TYPE)
    }
}

impl DsvWriter {
    /// Create a writer with the given delimiter and content type.
    ///
    /// The delimiter is expected to be non-empty; an empty delimiter would
    /// match every cell and quote all of them.
    pub fn new(delimiter: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            content_type: content_type.into(),
            escape_rule: EscapeRule::default(),
            rows: vec![Vec::new()],
        }
    }

    /// Use a different escaping rule
    pub fn with_escape_rule(mut self, escape_rule: EscapeRule) -> Self {
        self.escape_rule = escape_rule;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn escape_rule(&self) -> EscapeRule {
        self.escape_rule
    }

    /// Escape already-sanitized cell text according to the escape rule
    pub fn escape(&self, value: &str) -> String {
        if self.escape_rule.needs_quotes(value, &self.delimiter) {
            wrap_with_quotes(value)
        } else {
            value.to_string()
        }
    }

    /// Sanitize, escape and append a value to the current row
    pub fn write_value(&mut self, value: Option<&Value>) {
        let cell = self.escape(&sanitize_value(value));
        self.push_cell(cell);
    }

    /// Escape and append plain text to the current row
    pub fn write_str(&mut self, value: &str) {
        let cell = self.escape(value);
        self.push_cell(cell);
    }

    /// Start a new, empty row
    pub fn write_line(&mut self) {
        self.rows.push(Vec::new());
    }

    fn push_cell(&mut self, cell: String) {
        match self.rows.last_mut() {
            Some(row) => row.push(cell),
            None => self.rows.push(vec![cell]),
        }
    }

    /// Rows that end up in the serialized text.
    ///
    /// The open row left behind by the last `write_line` carries no cells and
    /// is not part of the document.
    fn completed_rows(&self) -> &[Vec<String>] {
        match self.rows.split_last() {
            Some((last, rest)) if last.is_empty() => rest,
            _ => &self.rows,
        }
    }

    /// Number of rows the serialized text contains
    pub fn row_count(&self) -> usize {
        self.completed_rows().len()
    }

    /// Cells of every completed row, already escaped
    pub fn rows(&self) -> &[Vec<String>] {
        self.completed_rows()
    }

    /// Join cells with the delimiter and rows with CRLF, without a trailing
    /// separator. A writer with nothing written yields an empty string.
    pub fn to_text(&self) -> String {
        self.completed_rows()
            .iter()
            .map(|row| row.join(&self.delimiter))
            .collect::<Vec<_>>()
            .join(ROW_SEPARATOR)
    }

    /// Serialize and encode as UTF-8, tagged with the content type
    pub fn to_artifact(&self) -> Artifact {
        Artifact::new(self.to_text().into_bytes(), self.content_type.clone())
    }
}

impl fmt::Display for DsvWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
