//! Liquibase changelog reading.
//!
//! The changelog is the source of truth for which scripts are already wired
//! into migrations. It is read once per run and never written.

use crate::error::{ExportError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

/// Namespace of Liquibase changelog elements.
pub const CHANGELOG_NAMESPACE: &str = "http://www.liquibase.org/xml/ns/dbchangelog";

/// Script paths already referenced by the changelog.
///
/// Membership is exact string comparison; paths are not normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredPaths {
    paths: HashSet<String>,
}

enum Frame {
    ChangeSet,
    Other,
}

impl RegisteredPaths {
    /// Read and parse the changelog at `path`.
    ///
    /// A missing or malformed document is an error: without the complete
    /// set, new scripts could be silently left out of the fragment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ExportError::manifest(path, e))?;
        let registered = Self::from_xml(&content, path)?;
        info!(
            "Loaded {} registered script paths from {:?}",
            registered.len(),
            path
        );
        Ok(registered)
    }

    /// Parse changelog XML. `source` is only used in error messages.
    ///
    /// Collects the `path` of each `sqlFile` that is a direct child of a
    /// `changeSet` directly under the document root.
    pub fn from_xml(xml: &str, source: &Path) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = NsReader::from_str(xml);

        let mut paths = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut seen_root = false;

        loop {
            let (ns, event) = reader
                .read_resolved_event()
                .map_err(|e| ExportError::manifest(source, e))?;
            let in_changelog = matches!(
                ns,
                ResolveResult::Bound(Namespace(uri)) if uri == CHANGELOG_NAMESPACE.as_bytes()
            );

            match event {
                Event::Start(element) => {
                    if stack.is_empty() {
                        check_single_root(&mut seen_root, source)?;
                    }
                    if is_sql_file(&stack, in_changelog, &element) {
                        paths.insert(path_attribute(&element, source)?);
                    }
                    let frame = if stack.len() == 1
                        && in_changelog
                        && element.local_name().as_ref() == b"changeSet"
                    {
                        Frame::ChangeSet
                    } else {
                        Frame::Other
                    };
                    stack.push(frame);
                }
                Event::Empty(element) => {
                    if stack.is_empty() {
                        check_single_root(&mut seen_root, source)?;
                    }
                    if is_sql_file(&stack, in_changelog, &element) {
                        paths.insert(path_attribute(&element, source)?);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(ExportError::manifest(source, "document has no root element"));
        }
        if !stack.is_empty() {
            return Err(ExportError::manifest(
                source,
                "unexpected end of document: unclosed elements",
            ));
        }

        Ok(Self { paths })
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.paths.contains(relative_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Registered paths in sorted order.
    pub fn sorted(&self) -> BTreeSet<&str> {
        self.paths.iter().map(String::as_str).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RegisteredPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn check_single_root(seen_root: &mut bool, source: &Path) -> Result<()> {
    if *seen_root {
        return Err(ExportError::manifest(source, "multiple root elements"));
    }
    *seen_root = true;
    Ok(())
}

fn is_sql_file(stack: &[Frame], in_changelog: bool, element: &BytesStart<'_>) -> bool {
    in_changelog
        && stack.len() == 2
        && matches!(stack.last(), Some(Frame::ChangeSet))
        && element.local_name().as_ref() == b"sqlFile"
}

fn path_attribute(element: &BytesStart<'_>, source: &Path) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ExportError::manifest(source, e))?;
        if attr.key.as_ref() == b"path" {
            let value = attr
                .unescape_value()
                .map_err(|e| ExportError::manifest(source, e))?;
            return Ok(value.into_owned());
        }
    }
    Err(ExportError::manifest(
        source,
        "sqlFile element without a path attribute",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(xml: &str) -> Result<RegisteredPaths> {
        RegisteredPaths::from_xml(xml, &PathBuf::from("changelog_post.xml"))
    }

    const CHANGELOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<databaseChangeLog
    xmlns="http://www.liquibase.org/xml/ns/dbchangelog"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <changeSet id="1" author="dev" runOnChange="true">
        <sqlFile path="public/enums/color.sql" relativeToChangelogFile="true" splitStatements="true" encoding="utf8" />
        <sqlFile path="public/functions/touch.sql" relativeToChangelogFile="true" splitStatements="false" encoding="utf8" />
    </changeSet>
    <changeSet id="2" author="dev">
        <comment>views</comment>
        <sqlFile path="sales/views/open_orders.sql"></sqlFile>
    </changeSet>
</databaseChangeLog>
"#;

    #[test]
    fn test_collects_sql_file_paths() {
        let registered = parse(CHANGELOG).unwrap();
        assert_eq!(registered.len(), 3);
        assert!(registered.contains("public/enums/color.sql"));
        assert!(registered.contains("public/functions/touch.sql"));
        assert!(registered.contains("sales/views/open_orders.sql"));
    }

    #[test]
    fn test_membership_is_exact() {
        let registered = parse(CHANGELOG).unwrap();
        assert!(!registered.contains("Public/enums/color.sql"));
        assert!(!registered.contains("public\\enums\\color.sql"));
        assert!(!registered.contains("./public/enums/color.sql"));
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<lb:databaseChangeLog xmlns:lb="http://www.liquibase.org/xml/ns/dbchangelog">
            <lb:changeSet id="1" author="dev"><lb:sqlFile path="a/views/v.sql"/></lb:changeSet>
        </lb:databaseChangeLog>"#;
        let registered = parse(xml).unwrap();
        assert!(registered.contains("a/views/v.sql"));
    }

    #[test]
    fn test_ignores_elements_outside_changelog_namespace() {
        let xml = r#"<databaseChangeLog>
            <changeSet><sqlFile path="public/views/v.sql"/></changeSet>
        </databaseChangeLog>"#;
        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_ignores_nested_sql_files() {
        let xml = r#"<databaseChangeLog xmlns="http://www.liquibase.org/xml/ns/dbchangelog">
            <changeSet id="1" author="dev">
                <rollback><sqlFile path="public/views/rollback.sql"/></rollback>
            </changeSet>
            <sqlFile path="public/views/toplevel.sql"/>
        </databaseChangeLog>"#;
        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_unescapes_path() {
        let xml = r#"<databaseChangeLog xmlns="http://www.liquibase.org/xml/ns/dbchangelog">
            <changeSet id="1" author="dev"><sqlFile path="r&amp;d/views/v.sql"/></changeSet>
        </databaseChangeLog>"#;
        assert!(parse(xml).unwrap().contains("r&d/views/v.sql"));
    }

    #[test]
    fn test_empty_changelog() {
        let xml = r#"<databaseChangeLog xmlns="http://www.liquibase.org/xml/ns/dbchangelog"/>"#;
        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_bom_is_accepted() {
        let xml = format!("\u{feff}{}", CHANGELOG);
        assert_eq!(parse(&xml).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_path_attribute_is_error() {
        let xml = r#"<databaseChangeLog xmlns="http://www.liquibase.org/xml/ns/dbchangelog">
            <changeSet id="1" author="dev"><sqlFile relativeToChangelogFile="true"/></changeSet>
        </databaseChangeLog>"#;
        assert!(matches!(parse(xml), Err(ExportError::Manifest { .. })));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        for xml in [
            "",
            "   ",
            "<databaseChangeLog><changeSet></databaseChangeLog>",
            "<databaseChangeLog><changeSet>",
            "<a/><b/>",
        ] {
            assert!(
                matches!(parse(xml), Err(ExportError::Manifest { .. })),
                "expected error for {:?}",
                xml
            );
        }
    }

    #[test]
    fn test_load_missing_file_is_manifest_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = RegisteredPaths::load(dir.path().join("changelog_post.xml")).unwrap_err();
        assert!(matches!(err, ExportError::Manifest { .. }));
    }

    #[test]
    fn test_sorted_listing() {
        let registered: RegisteredPaths = ["b/views/v.sql", "a/enums/e.sql"].into_iter().collect();
        let listed: Vec<&str> = registered.sorted().into_iter().collect();
        assert_eq!(listed, vec!["a/enums/e.sql", "b/views/v.sql"]);
    }
}
