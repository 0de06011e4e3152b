//! Output formatting for mdfe-cli (json, table)

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use mdfe_client::{ResponseBody, ResponseEnvelope};
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Field/value table
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.green());
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Report the status line of a response
    pub fn status(&self, envelope: &ResponseEnvelope) {
        let line = format!("HTTP {}", envelope.status);
        if envelope.is_success() {
            self.success(&line);
        } else {
            self.warn(&line);
        }
    }

    /// Print a JSON response body in the configured format
    ///
    /// Non-2xx responses are returned as errors carrying the body text.
    pub fn print_envelope(&self, envelope: &ResponseEnvelope) -> Result<()> {
        ensure_success(envelope)?;
        self.status(envelope);

        match &envelope.body {
            ResponseBody::Json(value) => self.print_value(value),
            ResponseBody::Raw(bytes) => {
                std::io::stdout()
                    .write_all(bytes)
                    .context("Failed to write response to stdout")?;
            }
        }
        Ok(())
    }

    /// Save a raw response body, or print it when no file is given
    pub fn save_document(&self, envelope: &ResponseEnvelope, out: Option<&Path>) -> Result<()> {
        ensure_success(envelope)?;

        let Some(path) = out else {
            return self.print_envelope(envelope);
        };

        let bytes = match &envelope.body {
            ResponseBody::Raw(bytes) => bytes.to_vec(),
            ResponseBody::Json(value) => serde_json::to_vec_pretty(value)?,
        };
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.success(&format!("Saved {} bytes to {}", bytes.len(), path.display()));
        Ok(())
    }

    fn print_value(&self, value: &Value) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                );
            }
            OutputFormat::Table => {
                let rows = field_rows(value);
                if rows.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(rows));
                }
            }
        }
    }
}

/// Turn a non-2xx envelope into an error so the process exits non-zero
fn ensure_success(envelope: &ResponseEnvelope) -> Result<()> {
    if envelope.is_success() {
        return Ok(());
    }
    bail!("HTTP {}: {}", envelope.status, body_text(&envelope.body))
}

fn body_text(body: &ResponseBody) -> String {
    match body {
        ResponseBody::Json(Value::Null) => "(empty body)".to_string(),
        ResponseBody::Json(value) => value.to_string(),
        ResponseBody::Raw(bytes) if bytes.is_empty() => "(empty body)".to_string(),
        ResponseBody::Raw(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
    }
}

/// Field display for table output
#[derive(Debug, Tabled, Serialize, PartialEq)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Flatten the top level of a JSON value into table rows
pub fn field_rows(value: &Value) -> Vec<FieldRow> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(field, v)| FieldRow {
                field: field.clone(),
                value: cell(v),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| FieldRow {
                field: i.to_string(),
                value: cell(v),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![FieldRow {
            field: "value".to_string(),
            value: cell(other),
        }],
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
