//! Configuration management for tabula
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`TABULA_*` prefix, `__` between sections)
//! 2. tabula.local.toml (local overrides)
//! 3. tabula.toml (project config)
//! 4. ~/.config/tabula/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! Besides logging settings, configuration declares record schemas: named
//! policies that become [`Schema`] record kinds at runtime.
//!
//! ```toml
//! [[schemas]]
//! name = "Book"
//! fields = ["author", "title", "isbn", "type"]
//! non_null_fields = ["title"]
//! hash_index_fields = ["isbn", "title"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabula::{Policy, Schema};

mod error;
mod loader;
mod paths;

pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main tabula configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulaConfig {
    pub logging: LoggingConfig,
    pub schemas: Vec<SchemaConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// A record schema as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_null_fields: Vec<String>,
    #[serde(default)]
    pub require_all_fields: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_index_fields: Option<Vec<String>>,
}

impl SchemaConfig {
    /// Builds the record policy this schema describes.
    pub fn policy(&self) -> Policy {
        let mut policy = Policy::new().with_non_null_fields(self.non_null_fields.iter().cloned());
        if let Some(fields) = &self.fields {
            policy = policy.with_fields(fields.iter().cloned());
        }
        if self.require_all_fields {
            policy = policy.require_all_fields();
        }
        if let Some(fields) = &self.hash_index_fields {
            policy = policy.with_hash_index_fields(fields.iter().cloned());
        }
        policy
    }

    /// Builds a runtime record kind for this schema.
    pub fn to_schema(&self) -> Schema {
        Schema::new(self.name.as_str(), self.policy())
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| ConfigError::SchemaError {
            schema: self.name.clone(),
            reason,
        };

        // An empty list declares nothing, the same as leaving it out.
        if let Some(fields) = self.fields.as_ref().filter(|fields| !fields.is_empty()) {
            if let Some(name) = first_duplicate(fields) {
                return Err(fail(format!("field '{name}' is declared twice")));
            }
        } else if self.require_all_fields {
            return Err(fail("require_all_fields needs declared fields".to_string()));
        }

        let mut names = self
            .fields
            .iter()
            .flatten()
            .chain(&self.non_null_fields)
            .chain(self.hash_index_fields.iter().flatten());
        if names.any(String::is_empty) {
            return Err(fail("field names can not be empty".to_string()));
        }
        if let Some(fields) = &self.hash_index_fields
            && let Some(name) = first_duplicate(fields)
        {
            return Err(fail(format!("hash index field '{name}' is listed twice")));
        }

        Ok(())
    }
}

impl TabulaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Check schema definitions: unique non-empty names, sane field lists.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for schema in &self.schemas {
            if schema.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "schema names can not be empty".to_string(),
                ));
            }
            if !seen.insert(schema.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "schema '{}' is defined twice",
                    schema.name
                )));
            }
            schema.validate()?;
        }
        Ok(())
    }

    /// Look up a schema by exact name.
    pub fn schema(&self, name: &str) -> Option<Schema> {
        self.schemas
            .iter()
            .find(|schema| schema.name == name)
            .map(SchemaConfig::to_schema)
    }

    /// All configured schemas, in declaration order.
    pub fn schemas(&self) -> Vec<Schema> {
        self.schemas.iter().map(SchemaConfig::to_schema).collect()
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.iter().map(|schema| schema.name.as_str()).collect()
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula::{RecordKind, fields};

    fn book() -> SchemaConfig {
        SchemaConfig {
            name: "Book".to_string(),
            fields: Some(vec!["author".into(), "title".into(), "isbn".into()]),
            non_null_fields: vec!["title".into()],
            require_all_fields: false,
            hash_index_fields: Some(vec!["isbn".into(), "title".into()]),
        }
    }

    #[test]
    fn default_config() {
        let config = TabulaConfig::default();
        assert_eq!(config.logging.level, "warn");
        assert!(config.schemas.is_empty());
        assert!(config.schema("Book").is_none());
    }

    #[test]
    fn schema_config_builds_policy() {
        let policy = book().policy();
        assert_eq!(policy.fields().unwrap(), ["author", "title", "isbn"]);
        assert_eq!(policy.key_fields(), ["isbn", "title"]);
        assert!(!policy.requires_all_fields());
    }

    #[test]
    fn configured_schema_validates_records() {
        let config = TabulaConfig {
            schemas: vec![book()],
            ..Default::default()
        };

        let schema = config.schema("Book").unwrap();
        assert_eq!(schema.name(), "Book");

        let record = schema
            .record(fields! { "isbn" => "978-1-61902-786-2", "title" => "Moshi Moshi" })
            .unwrap();
        assert_eq!(
            record.hash_index_key().unwrap().as_deref(),
            Some("Book:isbn:978-1-61902-786-2:title:Moshi Moshi")
        );

        let err = schema.record(fields! { "isbn" => "x" }).unwrap_err();
        assert_eq!(err.to_string(), "The following field is required: title");
    }

    #[test]
    fn duplicate_schema_names_are_rejected() {
        let config = TabulaConfig {
            schemas: vec![book(), book()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn require_all_without_fields_is_rejected() {
        let schema = SchemaConfig {
            fields: None,
            require_all_fields: true,
            ..book()
        };
        let err = schema.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema 'Book': require_all_fields needs declared fields"
        );
    }

    #[test]
    fn empty_lists_mean_undeclared() {
        let schema = SchemaConfig {
            fields: Some(Vec::new()),
            hash_index_fields: Some(Vec::new()),
            ..book()
        };
        schema.validate().unwrap();

        let record = schema
            .to_schema()
            .record(fields! { "title" => "Moshi Moshi", "price" => 25 })
            .unwrap();
        assert_eq!(record.hash_index_key().unwrap(), None);
        assert_eq!(record, fields! { "title" => "Moshi Moshi", "price" => 25 });

        let keyed = SchemaConfig {
            hash_index_fields: Some(Vec::new()),
            ..book()
        };
        assert_eq!(keyed.policy().key_fields(), ["author", "title", "isbn"]);

        let strict = SchemaConfig {
            fields: Some(Vec::new()),
            require_all_fields: true,
            ..book()
        };
        assert!(strict.validate().is_err());
    }

    #[test]
    fn empty_key_field_is_rejected() {
        let schema = SchemaConfig {
            hash_index_fields: Some(vec![String::new()]),
            ..book()
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn renders_schemas_as_toml() {
        let config = TabulaConfig {
            schemas: vec![book()],
            ..Default::default()
        };
        let rendered = config.to_toml().unwrap();

        assert!(rendered.contains("[[schemas]]"));
        assert!(rendered.contains("name = \"Book\""));

        let parsed: TabulaConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
