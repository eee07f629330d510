//! Configuration validation.

use super::Config;
use crate::error::{ExportError, Result};
use crate::source::SslMode;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.db.host.is_empty() {
        return Err(ExportError::Config("db.host is required".into()));
    }
    if config.db.database.is_empty() {
        return Err(ExportError::Config("db.database is required".into()));
    }
    if config.db.user.is_empty() {
        return Err(ExportError::Config("db.user is required".into()));
    }
    if config.db.port == 0 {
        return Err(ExportError::Config("db.port must be non-zero".into()));
    }
    SslMode::parse(&config.db.ssl_mode)?;

    // The database name becomes a directory, and the file names live inside it.
    if has_separator(&config.db.database) {
        return Err(ExportError::Config(format!(
            "db.database must not contain path separators, got '{}'",
            config.db.database
        )));
    }
    for (field, value) in [
        ("output.manifest_file", &config.output.manifest_file),
        ("output.fragment_file", &config.output.fragment_file),
    ] {
        if value.is_empty() || has_separator(value) {
            return Err(ExportError::Config(format!(
                "{} must be a plain file name, got '{}'",
                field, value
            )));
        }
    }
    if config.output.manifest_file == config.output.fragment_file {
        return Err(ExportError::Config(
            "output.fragment_file must differ from output.manifest_file".into(),
        ));
    }

    Ok(())
}

fn has_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, OutputConfig};

    fn valid_config() -> Config {
        Config {
            db: DatabaseConfig {
                database: "shop".to_string(),
                user: "postgres".to_string(),
                host: "localhost".to_string(),
                password: "password".to_string(),
                port: 5432,
                ssl_mode: "disable".to_string(),
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.db.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_user() {
        let mut config = valid_config();
        config.db.user = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = valid_config();
        config.db.ssl_mode = "sometimes".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_database_with_separator() {
        let mut config = valid_config();
        config.db.database = "../shop".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_fragment_same_as_manifest() {
        let mut config = valid_config();
        config.output.fragment_file = config.output.manifest_file.clone();
        assert!(validate(&config).is_err());
    }
}
