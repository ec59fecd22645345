//! The fixed generic table template and the DDL-level operations over it.
//!
//! Every table the gateway creates shares one column set: an
//! auto-incrementing `id`, three short strings, three integers, three
//! doubles, three unbounded texts, and three creation-time timestamps.
//! The set is a compile-time constant, not a runtime-inspected catalog.

use crate::error::AppError;
use crate::store::Store;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use uuid::Uuid;

/// Current schema version, written to the version row's `i1` and `d1`.
pub const SCHEMA_VERSION: i64 = 1;

/// `c1` marker of the reserved version row (id 1).
pub const VERSION_MARKER: &str = "___basic_db_version";

/// `c1` marker of the reserved placeholder row (id 100).
pub const RESERVE_MARKER: &str = "___systemReserve";

pub const VERSION_ROW_ID: i64 = 1;
pub const RESERVE_ROW_ID: i64 = 100;

/// Data columns of the template, in DDL order.
pub const DATA_COLUMNS: &[&str] = &[
    "c1", "c2", "c3", "i1", "i2", "i3", "d1", "d2", "d3", "t1", "t2", "t3", "v1", "v2", "v3",
];

/// Columns a caller may supply on insert: the data columns plus an
/// explicit `id`. The reserved-id floor (user rows at id >= 101) is a
/// documented convention, not enforced here.
pub fn is_insertable_column(name: &str) -> bool {
    name == "id" || is_data_column(name)
}

pub fn is_data_column(name: &str) -> bool {
    DATA_COLUMNS.contains(&name)
}

/// The `v*` columns hold timestamps; string values bound for them need a
/// SQL-side cast.
pub fn is_timestamp_column(name: &str) -> bool {
    matches!(name, "v1" | "v2" | "v3")
}

/// Column list for SELECT/RETURNING, fixed by the template.
pub fn select_column_list() -> &'static str {
    "id, c1, c2, c3, i1, i2, i3, d1, d2, d3, t1, t2, t3, v1, v2, v3"
}

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z][A-Za-z0-9_]{0,62}$").expect("identifier regex"))
}

/// Table names are interpolated into SQL text, so they must pass the
/// identifier shape check and must not collide with storage-internal
/// namespaces.
pub fn validate_table_name(name: &str) -> Result<(), AppError> {
    if !ident_re().is_match(name) {
        return Err(AppError::BadRequest(format!(
            "invalid table name: '{}'",
            name
        )));
    }
    if name.starts_with("pg_") || name.starts_with("sql_") {
        return Err(AppError::BadRequest(format!(
            "table name '{}' uses a reserved prefix",
            name
        )));
    }
    Ok(())
}

/// Index names share the identifier rules; they live in the store's
/// global namespace, not a per-table one.
pub fn validate_index_name(name: &str) -> Result<(), AppError> {
    if !ident_re().is_match(name) || name.starts_with("pg_") {
        return Err(AppError::BadRequest(format!(
            "invalid index name: '{}'",
            name
        )));
    }
    Ok(())
}

fn create_table_ddl(name: &str, c1_unique: bool) -> String {
    let c1_constraint = if c1_unique { " UNIQUE" } else { "" };
    format!(
        "CREATE TABLE IF NOT EXISTS {name} (\
         id BIGSERIAL PRIMARY KEY, \
         c1 VARCHAR(255){c1_constraint}, c2 VARCHAR(255), c3 VARCHAR(255), \
         i1 BIGINT, i2 BIGINT, i3 BIGINT, \
         d1 DOUBLE PRECISION, d2 DOUBLE PRECISION, d3 DOUBLE PRECISION, \
         t1 TEXT, t2 TEXT, t3 TEXT, \
         v1 TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
         v2 TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
         v3 TIMESTAMPTZ NOT NULL DEFAULT NOW())"
    )
}

/// The full creation batch, in execution order. The index statement is
/// skipped when `c1` is unique (the constraint already indexes it). The
/// final statement moves the id sequence past the reserved rows so
/// generated ids start at 101.
fn creation_statements(
    name: &str,
    c1_unique: bool,
    version_token: &str,
) -> Vec<(&'static str, String, Vec<Value>)> {
    let mut stmts: Vec<(&'static str, String, Vec<Value>)> = Vec::with_capacity(5);
    stmts.push(("create table", create_table_ddl(name, c1_unique), vec![]));
    if !c1_unique {
        stmts.push((
            "create c1 index",
            format!("CREATE INDEX IF NOT EXISTS idx_{name}_c1 ON {name} (c1)"),
            vec![],
        ));
    }
    stmts.push((
        "insert version row",
        format!("INSERT INTO {name} (id, c1, c2, c3, i1, d1) VALUES ($1, $2, $3, $4, $5, $6)"),
        vec![
            json!(VERSION_ROW_ID),
            json!(VERSION_MARKER),
            json!(version_token),
            json!(version_token),
            json!(SCHEMA_VERSION),
            json!(SCHEMA_VERSION as f64),
        ],
    ));
    stmts.push((
        "insert reserve row",
        format!("INSERT INTO {name} (id, c1) VALUES ($1, $2)"),
        vec![json!(RESERVE_ROW_ID), json!(RESERVE_MARKER)],
    ));
    stmts.push((
        "advance id sequence",
        "SELECT setval(pg_get_serial_sequence($1, 'id'), $2, true)".to_string(),
        vec![json!(name), json!(RESERVE_ROW_ID)],
    ));
    stmts
}

/// Result of one statement in a creation batch. Batches are not
/// transactional; the caller sees which step failed instead of a rollback.
#[derive(Serialize, Debug)]
pub struct StatementOutcome {
    pub statement: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub struct SchemaManager;

impl SchemaManager {
    /// Idempotently create the fixed-schema table, its `c1` index, and the
    /// two reserved rows (version marker at id 1, placeholder at id 100).
    /// Statements run strictly in sequence; each outcome is reported
    /// individually and a failure does not stop later statements.
    pub async fn create_table(
        store: &dyn Store,
        name: &str,
        c1_unique: bool,
    ) -> Result<Vec<StatementOutcome>, AppError> {
        validate_table_name(name)?;
        let token = Uuid::new_v4().to_string();
        let mut outcomes = Vec::new();
        for (label, sql, params) in creation_statements(name, c1_unique, &token) {
            match store.execute(&sql, &params).await {
                Ok(_) => outcomes.push(StatementOutcome {
                    statement: label,
                    ok: true,
                    detail: None,
                }),
                Err(e) => {
                    tracing::warn!(table = %name, step = label, error = %e, "creation statement failed");
                    outcomes.push(StatementOutcome {
                        statement: label,
                        ok: false,
                        detail: Some(e.to_string()),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Drop the table if it exists; absence is not an error.
    pub async fn drop_table(store: &dyn Store, name: &str) -> Result<(), AppError> {
        validate_table_name(name)?;
        store
            .execute(&format!("DROP TABLE IF EXISTS {name}"), &[])
            .await
            .map_err(|e| AppError::store(format!("drop table '{}' failed", name), e))?;
        Ok(())
    }

    /// Drop a named index if it exists. Index names are global in the
    /// store's namespace, so callers must avoid collisions across tables.
    pub async fn drop_index(store: &dyn Store, table: &str, index: &str) -> Result<(), AppError> {
        validate_table_name(table)?;
        validate_index_name(index)?;
        store
            .execute(&format!("DROP INDEX IF EXISTS {index}"), &[])
            .await
            .map_err(|e| {
                AppError::store(format!("drop index '{}' on '{}' failed", index, table), e)
            })?;
        Ok(())
    }

    /// User-created table names, excluding storage-internal namespaces.
    pub async fn list_tables(store: &dyn Store) -> Result<Vec<String>, AppError> {
        let sql = "SELECT table_name FROM information_schema.tables \
                   WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                   AND table_name NOT LIKE 'pg\\_%' AND table_name NOT LIKE 'sql\\_%' \
                   ORDER BY table_name";
        let rows = store
            .fetch_rows(sql, &[])
            .await
            .map_err(|e| AppError::store("list tables failed", e))?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("table_name").and_then(Value::as_str))
            .map(String::from)
            .collect())
    }
}
