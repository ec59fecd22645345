//! Executes builder statements against the store and interprets the
//! results: row sets, scalars, and mutation outcomes.

use crate::error::AppError;
use crate::sql::{self, ListFilter};
use crate::store::Store;
use serde_json::Value;
use std::collections::HashMap;

pub struct RecordService;

impl RecordService {
    /// Insert one row; returns the generated (or explicitly supplied) id.
    pub async fn insert(
        store: &dyn Store,
        table: &str,
        fields: &HashMap<String, Value>,
    ) -> Result<i64, AppError> {
        let q = sql::insert(table, fields)?;
        let rows = store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("insert into '{}' failed", table), e))?;
        rows.first()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                AppError::store(
                    format!("insert into '{}' returned no id", table),
                    crate::error::StoreError::Backend("missing RETURNING row".into()),
                )
            })
    }

    /// Zero or one row; absence is an empty result here, not an error.
    pub async fn get_by_id(
        store: &dyn Store,
        table: &str,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(table, id)?;
        let rows = store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("read '{}' id {} failed", table, id), e))?;
        Ok(rows.into_iter().next())
    }

    pub async fn get_by_c1(
        store: &dyn Store,
        table: &str,
        value: &str,
    ) -> Result<Vec<Value>, AppError> {
        let q = sql::select_by_c1(table, value)?;
        store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("lookup by c1 in '{}' failed", table), e))
    }

    pub async fn list(
        store: &dyn Store,
        table: &str,
        filter: &ListFilter,
    ) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(table, filter)?;
        store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("list '{}' failed", table), e))
    }

    /// Rows-changed count. Zero is a valid outcome (values unchanged) and
    /// is not conflated with "not found" at this layer.
    pub async fn update(
        store: &dyn Store,
        table: &str,
        id: i64,
        fields: &HashMap<String, Value>,
    ) -> Result<u64, AppError> {
        let q = sql::update(table, id, fields)?;
        let outcome = store
            .execute(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("update '{}' id {} failed", table, id), e))?;
        Ok(outcome.rows_affected)
    }

    pub async fn delete(store: &dyn Store, table: &str, id: i64) -> Result<u64, AppError> {
        let q = sql::delete(table, id)?;
        let outcome = store
            .execute(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("delete '{}' id {} failed", table, id), e))?;
        Ok(outcome.rows_affected)
    }

    pub async fn count(
        store: &dyn Store,
        table: &str,
        filter: &ListFilter,
    ) -> Result<i64, AppError> {
        let q = sql::count(table, filter)?;
        let rows = store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("count '{}' failed", table), e))?;
        Ok(rows
            .first()
            .and_then(|r| r.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Maximum id, or None when the table has no rows. None is distinct
    /// from 0 and surfaces as a null sentinel to callers.
    pub async fn max_id(store: &dyn Store, table: &str) -> Result<Option<i64>, AppError> {
        let q = sql::max_id(table)?;
        let rows = store
            .fetch_rows(&q.sql, &q.params)
            .await
            .map_err(|e| AppError::store(format!("max id of '{}' failed", table), e))?;
        Ok(rows
            .first()
            .and_then(|r| r.get("max_id"))
            .and_then(Value::as_i64))
    }
}
