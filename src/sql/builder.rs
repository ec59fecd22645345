//! Builds parameterized statements over the fixed column template.
//!
//! Table names are vetted before any SQL text is assembled; column names
//! come only from the template vocabulary. Every value is a bound
//! parameter.

use crate::error::AppError;
use crate::schema;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Exclusive id bounds plus pagination for list/count scans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub min_id: Option<i64>,
    pub max_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Placeholder for one bound column value. Timestamp columns take string
/// values, so they get a SQL-side cast.
fn placeholder(col: &str, n: usize) -> String {
    if schema::is_timestamp_column(col) {
        format!("${n}::timestamptz")
    } else {
        format!("${n}")
    }
}

fn check_scalar(col: &str, v: &Value) -> Result<(), AppError> {
    if v.is_array() || v.is_object() {
        return Err(AppError::BadRequest(format!(
            "column '{}' expects a scalar value",
            col
        )));
    }
    Ok(())
}

fn check_known_columns(
    fields: &HashMap<String, Value>,
    allow: fn(&str) -> bool,
) -> Result<(), AppError> {
    for k in fields.keys() {
        if !allow(k) {
            return Err(AppError::BadRequest(format!("unknown column: '{}'", k)));
        }
    }
    Ok(())
}

/// INSERT over exactly the supplied columns; unspecified columns take the
/// storage defaults. The generated id comes back via RETURNING.
pub fn insert(table: &str, fields: &HashMap<String, Value>) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    if fields.is_empty() {
        return Err(AppError::BadRequest(
            "at least one column value is required".into(),
        ));
    }
    check_known_columns(fields, schema::is_insertable_column)?;
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    // Template order, not map order, so statement text is deterministic.
    for col in std::iter::once("id").chain(schema::DATA_COLUMNS.iter().copied()) {
        let Some(v) = fields.get(col) else { continue };
        check_scalar(col, v)?;
        let n = q.push_param(v.clone());
        cols.push(col);
        placeholders.push(placeholder(col, n));
    }
    q.sql = format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING id",
        cols.join(", "),
        placeholders.join(", ")
    );
    Ok(q)
}

pub fn select_by_id(table: &str, id: i64) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    q.push_param(Value::from(id));
    q.sql = format!(
        "SELECT {} FROM {table} WHERE id = $1",
        schema::select_column_list()
    );
    Ok(q)
}

/// Equality lookup on the indexed `c1` column; zero or more rows.
pub fn select_by_c1(table: &str, value: &str) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    q.push_param(Value::from(value));
    q.sql = format!(
        "SELECT {} FROM {table} WHERE c1 = $1 ORDER BY id ASC",
        schema::select_column_list()
    );
    Ok(q)
}

fn id_range_clause(q: &mut QueryBuf, filter: &ListFilter) -> String {
    let mut parts = Vec::new();
    if let Some(min) = filter.min_id {
        let n = q.push_param(Value::from(min));
        parts.push(format!("id > ${n}"));
    }
    if let Some(max) = filter.max_id {
        let n = q.push_param(Value::from(max));
        parts.push(format!("id < ${n}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// Filtered, paginated scan. Bounds are exclusive on both ends; rows come
/// back in ascending id order so limit/offset pagination is stable across
/// calls. Ordering is applied on the unfiltered path too.
pub fn select_list(table: &str, filter: &ListFilter) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    let where_clause = id_range_clause(&mut q, filter);
    let limit_clause = filter
        .limit
        .map(|n| format!(" LIMIT {n}"))
        .unwrap_or_default();
    let offset_clause = filter
        .offset
        .map(|n| format!(" OFFSET {n}"))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {table}{}{}{}{}",
        schema::select_column_list(),
        where_clause,
        " ORDER BY id ASC",
        limit_clause,
        offset_clause
    );
    Ok(q)
}

/// UPDATE keyed by id over the supplied columns. The id itself is not
/// updatable.
pub fn update(table: &str, id: i64, fields: &HashMap<String, Value>) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    if fields.is_empty() {
        return Err(AppError::BadRequest(
            "at least one column value is required".into(),
        ));
    }
    if fields.contains_key("id") {
        return Err(AppError::BadRequest("'id' cannot be updated".into()));
    }
    check_known_columns(fields, schema::is_data_column)?;
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for col in schema::DATA_COLUMNS.iter().copied() {
        let Some(v) = fields.get(col) else { continue };
        check_scalar(col, v)?;
        let n = q.push_param(v.clone());
        sets.push(format!("{col} = {}", placeholder(col, n)));
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {table} SET {} WHERE id = ${id_param}",
        sets.join(", ")
    );
    Ok(q)
}

pub fn delete(table: &str, id: i64) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    q.push_param(Value::from(id));
    q.sql = format!("DELETE FROM {table} WHERE id = $1");
    Ok(q)
}

/// Row count under the same exclusive bounds as `select_list`.
pub fn count(table: &str, filter: &ListFilter) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    let where_clause = id_range_clause(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) AS count FROM {table}{}", where_clause);
    Ok(q)
}

/// Maximum id, NULL when the table has no rows (distinct from 0).
pub fn max_id(table: &str) -> Result<QueryBuf, AppError> {
    schema::validate_table_name(table)?;
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT MAX(id) AS max_id FROM {table}");
    Ok(q)
}
