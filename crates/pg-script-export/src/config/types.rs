//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database to export from.
    pub db: DatabaseConfig,

    /// Output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name. Also names the output directory.
    pub database: String,

    /// Username.
    pub user: String,

    /// Database host.
    pub host: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// SSL mode (default: "disable").
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

/// Where scripts, the changelog manifest and the index fragment live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory containing the `<database>/` tree (default: ".").
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Changelog manifest file name inside `<database>/`.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Index fragment file name inside `<database>/`.
    #[serde(default = "default_fragment_file")]
    pub fragment_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            manifest_file: default_manifest_file(),
            fragment_file: default_fragment_file(),
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_file() -> String {
    "changelog_post.xml".to_string()
}

fn default_fragment_file() -> String {
    "lb_help_script.txt".to_string()
}
