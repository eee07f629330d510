//! Canonical script locations.

use crate::error::{ExportError, Result};
use std::path::{Path, PathBuf};

/// Where a script is written, and how the changelog refers to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPath {
    /// `<database root>/<schema>/<subpath...>/<name>.sql`
    pub absolute: PathBuf,

    /// `<schema>/<subpath...>/<name>.sql`, always `/` separated.
    /// This is the key compared against the changelog.
    pub relative: String,
}

/// Changelog-relative path: `<schema>/<subpath...>/<name>.sql`.
pub fn relative_path(schema: &str, subpath: &[&str], name: &str) -> String {
    let mut relative = String::from(schema);
    for segment in subpath {
        relative.push('/');
        relative.push_str(segment);
    }
    relative.push('/');
    relative.push_str(name);
    relative.push_str(".sql");
    relative
}

/// Resolve the script location for an object and create its directory.
pub fn resolve(database_root: &Path, schema: &str, subpath: &[&str], name: &str) -> Result<ScriptPath> {
    let mut dir = database_root.join(schema);
    for segment in subpath {
        dir.push(segment);
    }

    std::fs::create_dir_all(&dir).map_err(|e| ExportError::write(&dir, e))?;

    Ok(ScriptPath {
        absolute: dir.join(format!("{}.sql", name)),
        relative: relative_path(schema, subpath, name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_creates_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("shop");

        let path = resolve(&root, "public", &["triggers", "orders"], "check_row").unwrap();

        assert_eq!(path.relative, "public/triggers/orders/check_row.sql");
        assert_eq!(
            path.absolute,
            root.join("public").join("triggers").join("orders").join("check_row.sql")
        );
        assert!(root.join("public/triggers/orders").is_dir());
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        assert_eq!(relative_path("public", &["enums"], "color"), "public/enums/color.sql");
        assert_eq!(
            relative_path("Sales", &["triggers", "Orders"], "Audit"),
            "Sales/triggers/Orders/Audit.sql"
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let first = resolve(dir.path(), "public", &["enums"], "color").unwrap();
        let second = resolve(dir.path(), "public", &["enums"], "color").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_fails_when_directory_is_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("public"), "not a directory").unwrap();
        let err = resolve(dir.path(), "public", &["views"], "v").unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
