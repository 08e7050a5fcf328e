//! Check command implementation.

use std::path::Path;

use anyhow::Result;
use tabula_config::TabulaConfig;

/// Validates the input and prints its canonical JSON.
pub fn run(config: &TabulaConfig, schema: &str, file: Option<&Path>) -> Result<()> {
    let record = super::load_record(config, schema, file)?;
    println!("{}", record.serialize()?);
    Ok(())
}
