//! CLI command implementations.

pub mod check;
pub mod key;
pub mod schemas;
pub mod version;

use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tabula::{FieldMap, Record, Schema, Value};
use tabula_config::TabulaConfig;
use tracing::debug;

/// Reads a JSON object from `file`, or from stdin when no file is given.
fn read_object(file: Option<&Path>) -> Result<FieldMap> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("Failed to read stdin")?,
    };

    let json: serde_json::Value = serde_json::from_str(&text).context("Input is not valid JSON")?;
    let serde_json::Value::Object(object) = json else {
        bail!("Input must be a JSON object");
    };

    Ok(object
        .iter()
        .map(|(key, value)| (key.clone(), Value::from_json(value)))
        .collect())
}

fn find_schema(config: &TabulaConfig, name: &str) -> Result<Schema> {
    match config.schema(name) {
        Some(schema) => Ok(schema),
        None if config.schemas.is_empty() => bail!("Unknown schema '{name}': no schemas are configured"),
        None => bail!(
            "Unknown schema '{name}'. Configured schemas: {}",
            config.schema_names().join(", ")
        ),
    }
}

/// Reads input and validates it as a record of the named schema.
fn load_record(config: &TabulaConfig, name: &str, file: Option<&Path>) -> Result<Record<Schema>> {
    let schema = find_schema(config, name)?;
    let raw = read_object(file)?;
    debug!(schema = %name, fields = raw.len(), "Validating input");

    // The record error message is the whole diagnosis.
    Ok(schema.record(raw)?)
}
