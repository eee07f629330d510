//! Script serialization.

use super::path::{resolve, ScriptPath};
use crate::error::{ExportError, Result};
use crate::source::ExtractedObject;
use std::io::Write;
use std::path::Path;

/// UTF-8 byte order mark written at the start of every output file.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Separator between objects that share one script (function overloads).
const OBJECT_SEPARATOR: &str = "\n\n";

/// Terminate `script` with `;` so it can be followed by another statement.
///
/// `pg_get_functiondef` ends a definition with a newline but no terminator.
fn terminated(mut script: String) -> String {
    let end = script.trim_end().len();
    script.truncate(end);
    if !script.ends_with(';') {
        script.push(';');
    }
    script
}

/// Render `header + body + footer` for one object.
pub fn render(object: &ExtractedObject) -> String {
    let header = object.header();
    let body = object.body();
    let footer = object.footer();

    let mut script = String::with_capacity(
        header.as_ref().map_or(0, String::len) + body.len() + footer.map_or(0, str::len),
    );
    if let Some(header) = header {
        script.push_str(&header);
    }
    script.push_str(body);
    if let Some(footer) = footer {
        script.push_str(footer);
    }
    script
}

/// Write `content` to `path` behind a byte order mark, replacing any existing file.
pub fn write_script(path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::File::create(path).map_err(|e| ExportError::write(path, e))?;
    file.write_all(UTF8_BOM)
        .and_then(|_| file.write_all(content.as_bytes()))
        .map_err(|e| ExportError::write(path, e))?;
    Ok(())
}

/// Resolve the location of `object` under `database_root` and write its script.
pub fn save_object(database_root: &Path, object: &ExtractedObject) -> Result<ScriptPath> {
    save_objects(database_root, &[object])
}

/// Write several objects that resolve to the same script, in the given order.
///
/// The location is taken from the first object; callers group by
/// [`relative_path`](super::relative_path) beforehand. A single object is
/// written as rendered. With several, every rendered object is terminated
/// with `;` so the file still runs as one statement batch.
pub fn save_objects(database_root: &Path, objects: &[&ExtractedObject]) -> Result<ScriptPath> {
    let first = objects.first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "no objects to save")
    })?;
    let path = resolve(database_root, first.schema(), &first.subpath(), first.name())?;

    let content = match objects {
        [single] => render(single),
        _ => objects
            .iter()
            .map(|object| terminated(render(object)))
            .collect::<Vec<_>>()
            .join(OBJECT_SEPARATOR),
    };
    write_script(&path.absolute, &content)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn function(name: &str, definition: &str) -> ExtractedObject {
        ExtractedObject::Function {
            schema: "public".into(),
            name: name.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn test_enum_script_content() {
        let dir = TempDir::new().unwrap();
        let object = ExtractedObject::Enum {
            schema: "public".into(),
            name: "color".into(),
            labels: "'red', 'green'".into(),
        };

        let path = save_object(dir.path(), &object).unwrap();

        assert_eq!(path.relative, "public/enums/color.sql");
        let bytes = std::fs::read(&path.absolute).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(
            std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap(),
            "CREATE TYPE public.color AS ENUM (\n\t'red', 'green'\n);"
        );
    }

    #[test]
    fn test_function_script_is_body_only() {
        let dir = TempDir::new().unwrap();
        let body = "CREATE OR REPLACE FUNCTION public.one()\n RETURNS integer\n LANGUAGE sql\nAS $function$select 1;$function$\n";

        let path = save_object(dir.path(), &function("one", body)).unwrap();

        let bytes = std::fs::read(&path.absolute).unwrap();
        assert_eq!(&bytes[UTF8_BOM.len()..], body.as_bytes());
    }

    #[test]
    fn test_overloads_share_one_script() {
        let dir = TempDir::new().unwrap();
        let a = function("add", "CREATE FUNCTION public.add(a int)");
        let b = function("add", "CREATE FUNCTION public.add(a int, b int)");

        let path = save_objects(dir.path(), &[&a, &b]).unwrap();

        let bytes = std::fs::read(&path.absolute).unwrap();
        assert_eq!(
            &bytes[UTF8_BOM.len()..],
            b"CREATE FUNCTION public.add(a int);\n\nCREATE FUNCTION public.add(a int, b int);"
        );
    }

    #[test]
    fn test_grouped_definitions_are_each_terminated() {
        let dir = TempDir::new().unwrap();
        let one = function(
            "add",
            "CREATE OR REPLACE FUNCTION public.add(a integer)\n RETURNS integer\n LANGUAGE sql\nAS $function$select a;$function$\n",
        );
        let two = function(
            "add",
            "CREATE OR REPLACE FUNCTION public.add(a integer, b integer)\n RETURNS integer\n LANGUAGE sql\nAS $function$select a + b;$function$\n",
        );

        let path = save_objects(dir.path(), &[&one, &two]).unwrap();

        let bytes = std::fs::read(&path.absolute).unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let definitions: Vec<&str> = text.split(OBJECT_SEPARATOR).collect();
        assert_eq!(definitions.len(), 2);
        for definition in definitions {
            assert!(definition.starts_with("CREATE OR REPLACE FUNCTION"));
            assert!(definition.ends_with("$function$;"), "{definition:?}");
        }
    }

    #[test]
    fn test_terminated_keeps_existing_semicolon() {
        assert_eq!(terminated("DROP VIEW v;\n".to_string()), "DROP VIEW v;");
        assert_eq!(terminated("SELECT 1\n\n".to_string()), "SELECT 1;");
    }

    #[test]
    fn test_rewrite_truncates_previous_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("v.sql");

        write_script(&target, "a much longer first version").unwrap();
        write_script(&target, "short").unwrap();

        let bytes = std::fs::read(&target).unwrap();
        assert_eq!(&bytes[UTF8_BOM.len()..], b"short");
    }
}
