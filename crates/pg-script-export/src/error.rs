//! Error types for the export library.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for database connection or catalog query errors.
pub const EXIT_DATABASE_ERROR: u8 = 2;
/// Exit code for a missing or malformed changelog manifest.
pub const EXIT_MANIFEST_ERROR: u8 = 3;
/// Exit code for filesystem errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration error (invalid JSON/YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog query or session error
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// Connection setup error with context
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Changelog manifest could not be read or parsed
    #[error("Manifest error in {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// A script or the index fragment could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        ExportError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Manifest error for the given document
    pub fn manifest(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ExportError::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a Write error for the given file
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Write {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::Config(_) | ExportError::Yaml(_) | ExportError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            ExportError::Database(_) | ExportError::Connection { .. } => EXIT_DATABASE_ERROR,
            ExportError::Manifest { .. } => EXIT_MANIFEST_ERROR,
            ExportError::Write { .. } | ExportError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExportError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(
            ExportError::connection("refused", "connecting").exit_code(),
            EXIT_DATABASE_ERROR
        );
        assert_eq!(
            ExportError::manifest("changelog_post.xml", "bad").exit_code(),
            EXIT_MANIFEST_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ExportError::write("a.sql", io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ExportError::write("db/public/views/v.sql", io);
        let text = err.format_detailed();
        assert!(text.starts_with("Error: Failed to write db/public/views/v.sql"));
        assert!(text.contains("Caused by:\n  1: disk full"));
    }
}
