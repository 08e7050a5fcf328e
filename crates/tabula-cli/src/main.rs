//! tabula command line.
//!
//! Validates JSON documents as records of configured schemas.
//!
//! # Quick Start
//!
//! ```bash
//! # tabula.toml
//! # [[schemas]]
//! # name = "Book"
//! # fields = ["author", "title", "isbn"]
//! # non_null_fields = ["title"]
//!
//! # Validate and print canonical JSON
//! echo '{"title": "Moshi Moshi"}' | tabula check --schema Book
//!
//! # Derive the hash-index key
//! tabula key --schema Book --id 7 book.json
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabula_config::TabulaConfig;
use tracing_subscriber::EnvFilter;

/// tabula - immutable validated records.
#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding tabula.toml.
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Validate a JSON object and print it as canonical record JSON.
    Check {
        /// Schema to validate against.
        #[arg(short, long)]
        schema: String,

        /// JSON file to read (stdin when omitted).
        file: Option<PathBuf>,
    },

    /// Print the hash-index key of a JSON object.
    Key {
        /// Schema to validate against.
        #[arg(short, long)]
        schema: String,

        /// Object id placed after the schema name.
        #[arg(long)]
        id: Option<u64>,

        /// JSON file to read (stdin when omitted).
        file: Option<PathBuf>,
    },

    /// List configured schemas.
    Schemas {
        /// Print the effective configuration as TOML instead.
        #[arg(long)]
        toml: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        commands::version::run();
        return Ok(());
    }

    let config = TabulaConfig::load_from_dir(&cli.project).with_context(|| {
        format!("Failed to load configuration from {}", cli.project.display())
    })?;

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => Ok(()),
        Commands::Check { schema, file } => commands::check::run(&config, &schema, file.as_deref()),
        Commands::Key { schema, id, file } => {
            commands::key::run(&config, &schema, id, file.as_deref())
        }
        Commands::Schemas { toml } => commands::schemas::run(&config, toml),
    }
}
