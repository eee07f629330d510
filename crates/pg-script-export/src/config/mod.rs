//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from a file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Root of the per-database tree: `<output.root>/<database>`.
    pub fn database_root(&self) -> PathBuf {
        self.output.root.join(&self.db.database)
    }

    /// Path of the changelog manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.database_root().join(&self.output.manifest_file)
    }

    /// Path of the index fragment.
    pub fn fragment_path(&self) -> PathBuf {
        self.database_root().join(&self.output.fragment_file)
    }
}

impl DatabaseConfig {
    /// Build a libpq-style connection string with the password redacted, for logs.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password=*** sslmode={}",
            self.host, self.port, self.database, self.user, self.ssl_mode
        )
    }
}
