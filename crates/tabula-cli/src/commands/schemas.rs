//! Schemas command implementation.

use anyhow::Result;
use tabula::RecordKind;
use tabula_config::TabulaConfig;

/// Lists configured schemas and their policies.
pub fn run(config: &TabulaConfig, as_toml: bool) -> Result<()> {
    if as_toml {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let schemas = config.schemas();
    if schemas.is_empty() {
        println!("No schemas configured.");
        return Ok(());
    }

    for schema in &schemas {
        let policy = schema.policy();
        println!("{}", schema.name());
        match policy.fields() {
            Some(fields) => println!("  fields:            {}", fields.join(", ")),
            None => println!("  fields:            (any)"),
        }
        if !policy.non_null_fields().is_empty() {
            let names: Vec<&str> = policy.non_null_fields().iter().map(String::as_str).collect();
            println!("  non-null:          {}", names.join(", "));
        }
        if policy.requires_all_fields() {
            println!("  require all:       yes");
        }
        println!("  hash index fields: {}", policy.key_fields().join(", "));
    }
    Ok(())
}
