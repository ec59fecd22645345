//! Store collaborator: prepared-statement execution against the backing
//! SQL engine, plus the production PostgreSQL implementation.

use crate::error::StoreError;
use crate::sql::PgBindValue;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

/// Outcome of a mutating statement.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
}

/// Prepared-statement interface consumed by the gateway. Statement text
/// contains only vetted identifiers; every value arrives through `params`
/// and must be bound, never interpolated. Generated identifiers come back
/// through `fetch_rows` via RETURNING.
#[async_trait]
pub trait Store: Send + Sync {
    /// Execute a row-returning statement. Rows come back as JSON objects
    /// keyed by column name.
    async fn fetch_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>, StoreError>;

    /// Execute a mutating statement.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecOutcome, StoreError>;
}

/// PostgreSQL-backed store over a shared `sqlx` pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn fetch_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>, StoreError> {
        tracing::debug!(sql = %sql, params = ?params, "fetch");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecOutcome, StoreError> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let result = query.execute(&self.pool).await?;
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
        })
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decode one cell to JSON by trying the types the fixed template can
/// produce: bigint ids/integers, double precision, timestamptz, text.
fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
