//! Key command implementation.

use std::path::Path;

use anyhow::Result;
use tabula_config::TabulaConfig;
use tracing::info;

/// Validates the input and prints its hash-index key.
///
/// Prints nothing when no key field holds a value.
pub fn run(config: &TabulaConfig, schema: &str, id: Option<u64>, file: Option<&Path>) -> Result<()> {
    let record = super::load_record(config, schema, file)?;

    match record.hash_index_key_with_id(id)? {
        Some(key) => println!("{key}"),
        None => info!(schema = %schema, "No key fields hold a value"),
    }
    Ok(())
}
