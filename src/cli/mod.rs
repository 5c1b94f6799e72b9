//! CLI module for the dsv-export binary
//!
//! Reads a JSON array of objects and writes it as delimiter-separated text,
//! either to stdout or as a download into a directory.

pub mod error;

pub use error::CliError;

use crate::config::ExportConfig;
use crate::export::{CsvExporter, DownloadOutcome, Record};
use crate::storage::FileSystemSink;
use crate::writer::EscapeRule;
use clap::Parser;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Export a JSON array of records as CSV
#[derive(Debug, Parser)]
#[command(name = "dsv-export", version, about, long_about = None)]
pub struct CliArgs {
    /// JSON file with an array of objects ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Configuration file (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cell separator
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Comma-separated column order
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Do not write a header row
    #[arg(long)]
    pub no_headers: bool,

    /// Only quote cells containing the delimiter or a quote followed by CRLF
    #[arg(long)]
    pub legacy_escaping: bool,

    /// Save the document into this directory instead of printing it
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Filename used with --out-dir
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Log debug output and download failures
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Load a configuration file, picking the format from its extension
pub fn load_config(path: &Path) -> Result<ExportConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let config = match extension.as_deref() {
        Some("json") => ExportConfig::from_json_str(&content)?,
        Some("yaml") | Some("yml") => ExportConfig::from_yaml_str(&content)?,
        Some("toml") => ExportConfig::from_toml_str(&content)?,
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown config format: {}",
                path.display()
            )));
        }
    };
    Ok(config)
}

/// Parse a JSON array of objects into records
pub fn parse_records(content: &str) -> Result<Vec<Record>, CliError> {
    let values: Vec<Value> = serde_json::from_str(content)
        .map_err(|e| CliError::InvalidInput(format!("Expected a JSON array: {}", e)))?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(CliError::InvalidInput(format!(
                "Record {} is not an object: {}",
                idx, other
            ))),
        })
        .collect()
}

/// Apply command line overrides on top of a loaded configuration
pub fn apply_overrides(mut config: ExportConfig, args: &CliArgs) -> ExportConfig {
    if let Some(delimiter) = &args.delimiter {
        config.delimiter = delimiter.clone();
    }
    if let Some(columns) = &args.columns {
        config.columns = Some(columns.clone());
    }
    if args.no_headers {
        config.include_headers = false;
    }
    if args.legacy_escaping {
        config.escape_rule = EscapeRule::Legacy;
    }
    if let Some(filename) = &args.filename {
        config.filename = Some(filename.clone());
    }
    if args.verbose {
        config.dev_mode = true;
    }
    config
}

/// Run the tool, printing text output to `out`
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExportConfig::default(),
    };
    let config = apply_overrides(config, args);
    let records = parse_records(&load_input(&args.input)?)?;
    debug!("Loaded {} record(s) from {}", records.len(), args.input);

    let exporter = CsvExporter::new(config);

    match &args.out_dir {
        Some(dir) => {
            let sink = FileSystemSink::new(dir);
            match exporter.trigger_download(&records, &sink) {
                DownloadOutcome::Saved { filename, bytes } => {
                    writeln!(
                        out,
                        "Saved {} ({} bytes)",
                        dir.join(filename).display(),
                        bytes
                    )
                    .map_err(|e| CliError::WriteError(e.to_string()))?;
                    Ok(())
                }
                DownloadOutcome::Failed(err) => Err(err.into()),
            }
        }
        None => {
            let text = exporter.export_as_text(&records)?;
            out.write_all(text.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| CliError::WriteError(e.to_string()))
        }
    }
}
