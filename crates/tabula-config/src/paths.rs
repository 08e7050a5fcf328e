//! Configuration file locations

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

const PROJECT_FILE: &str = "tabula.toml";
const LOCAL_FILE: &str = "tabula.local.toml";

/// XDG-compliant paths for tabula
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("rs", "Tabula", "tabula"),
        }
    }

    /// User config directory (`~/.config/tabula/` on Linux)
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::XdgError("no home directory for user config".to_string()))
    }

    /// User config file (`~/.config/tabula/config.toml` on Linux)
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// Project config file, `tabula.toml`
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(PROJECT_FILE)
    }

    /// Local override file, `tabula.local.toml` (not meant to be committed)
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(LOCAL_FILE)
    }

    /// Whether `project_dir` has a `tabula.toml`
    pub fn is_initialized(project_dir: impl AsRef<Path>) -> bool {
        Self::project_config_file(project_dir).exists()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
