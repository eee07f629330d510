//! Catalog object types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of database object exported as a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Enum,
    Function,
    View,
    Trigger,
}

impl ObjectKind {
    /// Kinds in extraction order.
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Enum,
        ObjectKind::Function,
        ObjectKind::View,
        ObjectKind::Trigger,
    ];

    /// Directory under the schema that holds scripts of this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            ObjectKind::Enum => "enums",
            ObjectKind::Function => "functions",
            ObjectKind::View => "views",
            ObjectKind::Trigger => "triggers",
        }
    }

    /// Label of the section marker in the index fragment.
    pub fn section_label(&self) -> &'static str {
        match self {
            ObjectKind::Enum => "ENUM",
            ObjectKind::Function => "FUNCTIONS",
            ObjectKind::View => "VIEWS",
            ObjectKind::Trigger => "TRIGGERS",
        }
    }

    /// Whether Liquibase may split the script into individual statements.
    ///
    /// Function bodies contain their own `;` delimiters and must run whole.
    pub fn split_statements(&self) -> bool {
        !matches!(self, ObjectKind::Function)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Enum => "enum",
            ObjectKind::Function => "function",
            ObjectKind::View => "view",
            ObjectKind::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// One catalog row, typed per object kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedObject {
    /// Enumerated type. `labels` is the quoted, comma separated label list.
    Enum {
        schema: String,
        name: String,
        labels: String,
    },
    /// Function or procedure with its complete `CREATE OR REPLACE` statement.
    Function {
        schema: String,
        name: String,
        definition: String,
    },
    /// View with its defining query.
    View {
        schema: String,
        name: String,
        query: String,
    },
    /// Trigger with its `CREATE TRIGGER` statement and owning table.
    Trigger {
        schema: String,
        name: String,
        definition: String,
        table: String,
    },
}

impl ExtractedObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ExtractedObject::Enum { .. } => ObjectKind::Enum,
            ExtractedObject::Function { .. } => ObjectKind::Function,
            ExtractedObject::View { .. } => ObjectKind::View,
            ExtractedObject::Trigger { .. } => ObjectKind::Trigger,
        }
    }

    pub fn schema(&self) -> &str {
        match self {
            ExtractedObject::Enum { schema, .. }
            | ExtractedObject::Function { schema, .. }
            | ExtractedObject::View { schema, .. }
            | ExtractedObject::Trigger { schema, .. } => schema,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExtractedObject::Enum { name, .. }
            | ExtractedObject::Function { name, .. }
            | ExtractedObject::View { name, .. }
            | ExtractedObject::Trigger { name, .. } => name,
        }
    }

    /// Get the fully qualified object name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema(), self.name())
    }

    /// Definition body as returned by the catalog.
    pub fn body(&self) -> &str {
        match self {
            ExtractedObject::Enum { labels, .. } => labels,
            ExtractedObject::Function { definition, .. } => definition,
            ExtractedObject::View { query, .. } => query,
            ExtractedObject::Trigger { definition, .. } => definition,
        }
    }

    /// Directory segments between the schema directory and the script file.
    pub fn subpath(&self) -> Vec<&str> {
        match self {
            ExtractedObject::Trigger { table, .. } => {
                vec![ObjectKind::Trigger.directory(), table.as_str()]
            }
            other => vec![other.kind().directory()],
        }
    }

    /// Text written before the body so the script can be re-run on its own.
    pub fn header(&self) -> Option<String> {
        match self {
            ExtractedObject::Enum { schema, name, .. } => {
                Some(format!("CREATE TYPE {}.{} AS ENUM (\n\t", schema, name))
            }
            ExtractedObject::Function { .. } => None,
            ExtractedObject::View { schema, name, .. } => {
                Some(format!("CREATE OR REPLACE VIEW {}.{} AS\n", schema, name))
            }
            ExtractedObject::Trigger {
                schema,
                name,
                table,
                ..
            } => Some(format!(
                "DROP TRIGGER IF EXISTS {} ON {}.{};\n\n",
                name, schema, table
            )),
        }
    }

    /// Text written after the body.
    pub fn footer(&self) -> Option<&'static str> {
        match self {
            ExtractedObject::Enum { .. } => Some("\n);"),
            _ => None,
        }
    }
}
