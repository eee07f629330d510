//! Catalog queries and the schema filter wrapped around them.

use super::ObjectKind;

/// Schema patterns (SQL `LIKE`, `#` as escape) never exported.
///
/// Covers the information schema, the system catalog, Hasura's `hdb_*`
/// schemas and anything starting with an underscore.
pub const EXCLUDED_SCHEMA_PATTERNS: [&str; 4] = [
    "information#_schema",
    "pg#_catalog",
    "hdb#_%",
    "#_%",
];

/// Wrap a base select so that excluded schemas are dropped and rows come
/// back ordered by schema then name in byte order.
///
/// The base select must expose `schemaname`, `name` and `body` columns.
/// `body` only breaks ties between overloads sharing a name.
pub fn filtered_query(base: &str) -> String {
    let exclusions = EXCLUDED_SCHEMA_PATTERNS
        .iter()
        .map(|pattern| format!("x.schemaname not like '{}' escape '#'", pattern))
        .collect::<Vec<_>>()
        .join("\n  and ");

    format!(
        "select * from (\n{}\n) x\nwhere {}\norder by x.schemaname::text collate \"C\", x.name::text collate \"C\", x.body collate \"C\"",
        base.trim(),
        exclusions
    )
}

/// Unfiltered select for one object kind.
pub fn base_query(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Enum => {
            r#"
            SELECT n.nspname AS schemaname,
                   t.typname AS name,
                   string_agg(quote_literal(e.enumlabel), ', ' ORDER BY e.enumsortorder) AS body
            FROM pg_catalog.pg_type t
            JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            GROUP BY n.nspname, t.typname
            "#
        }
        ObjectKind::Function => {
            r#"
            SELECT s.nspname AS schemaname,
                   p.proname AS name,
                   pg_get_functiondef(p.oid) AS body
            FROM pg_catalog.pg_proc p
            JOIN pg_catalog.pg_namespace s ON s.oid = p.pronamespace
            JOIN pg_catalog.pg_language lang ON lang.oid = p.prolang
                 AND lang.lanname IN ('sql', 'plpgsql')
            "#
        }
        ObjectKind::View => {
            r#"
            SELECT schemaname,
                   viewname AS name,
                   definition AS body
            FROM pg_catalog.pg_views
            "#
        }
        ObjectKind::Trigger => {
            r#"
            SELECT s.nspname AS schemaname,
                   tr.tgname AS name,
                   pg_get_triggerdef(tr.oid) AS body,
                   t.relname AS table_name
            FROM pg_catalog.pg_trigger tr
            JOIN pg_catalog.pg_class t ON t.oid = tr.tgrelid
            JOIN pg_catalog.pg_namespace s ON s.oid = t.relnamespace
            WHERE NOT tr.tgisinternal
            "#
        }
    }
}

/// Filtered, ordered catalog query for one object kind.
pub fn catalog_query(kind: ObjectKind) -> String {
    filtered_query(base_query(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_gets_the_same_filter() {
        let tail = filtered_query("");
        let tail = &tail[tail.find(") x").unwrap()..];
        for kind in ObjectKind::ALL {
            let sql = catalog_query(kind);
            assert!(sql.starts_with("select * from (\n"), "{kind}");
            assert!(sql.ends_with(tail), "{kind}");
        }
    }

    #[test]
    fn test_filter_excludes_internal_schemas() {
        let sql = filtered_query("SELECT 1");
        assert!(sql.contains("x.schemaname not like 'information#_schema' escape '#'"));
        assert!(sql.contains("x.schemaname not like 'pg#_catalog' escape '#'"));
        assert!(sql.contains("x.schemaname not like 'hdb#_%' escape '#'"));
        assert!(sql.contains("x.schemaname not like '#_%' escape '#'"));
    }

    #[test]
    fn test_filter_orders_by_schema_then_name_bytewise() {
        let sql = filtered_query("SELECT 1");
        assert!(sql.ends_with(
            "order by x.schemaname::text collate \"C\", x.name::text collate \"C\", x.body collate \"C\""
        ));
    }

    #[test]
    fn test_function_query_restricts_languages() {
        assert!(base_query(ObjectKind::Function).contains("IN ('sql', 'plpgsql')"));
    }

    #[test]
    fn test_trigger_query_skips_internal_triggers() {
        let sql = base_query(ObjectKind::Trigger);
        assert!(sql.contains("NOT tr.tgisinternal"));
        assert!(sql.contains("AS table_name"));
    }

    #[test]
    fn test_enum_query_orders_labels() {
        assert!(base_query(ObjectKind::Enum).contains("ORDER BY e.enumsortorder"));
    }
}
