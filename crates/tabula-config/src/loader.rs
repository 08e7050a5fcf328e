//! Configuration loader with multi-source merging

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{Paths, Result, TabulaConfig};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader rooted at the current directory
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "TABULA".to_string(),
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "TABULA")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources, later sources winning
    pub fn load(self) -> Result<TabulaConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = TabulaConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config, then 3. project config, then 4. local overrides
        let mut files = Vec::with_capacity(3);
        if let Ok(user_config_file) = Paths::new().user_config_file() {
            files.push(user_config_file);
        }
        files.push(Paths::project_config_file(&self.project_dir));
        files.push(Paths::local_config_file(&self.project_dir));

        for file in files {
            if !file.exists() {
                continue;
            }
            debug!(path = %file.display(), "Adding configuration file");
            builder = builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (TABULA_LOGGING__LEVEL=debug)
        debug!(prefix = %self.env_prefix, "Adding environment overrides");
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: TabulaConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            project = %self.project_dir.display(),
            schemas = config.schemas.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any error
    pub fn load_or_default(self) -> TabulaConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
