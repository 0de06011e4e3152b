//! Command implementations for mdfe-cli

pub mod certificate;
pub mod documents;
pub mod lifecycle;

pub use certificate::register_certificate;
pub use documents::{fetch_xml, pre_print, print_cancellation, print_damdfe};
pub use lifecycle::{cancel, close, close_external, discard, include_conductor, query, transmit};

use std::path::Path;

use anyhow::{bail, Context, Result};
use mdfe_client::Params;
use serde_json::Value;

/// Read a JSON document from a file, or stdin when the path is `-`
pub fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Parse `key=value` pairs into request parameters
///
/// Values that parse as JSON keep their type, anything else is a string.
pub fn parse_params(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{}', expected key=value", pair);
        };
        if key.is_empty() {
            bail!("Invalid parameter '{}', empty key", pair);
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
