//! The gateway dispatch handler: welcome, authenticate, resolve the
//! route, gate by tier, parse parameters, execute, envelope.

use crate::auth::{self, Principal};
use crate::error::AppError;
use crate::response;
use crate::routes::intent::{self, Route};
use crate::schema::SchemaManager;
use crate::service::RecordService;
use crate::sql::ListFilter;
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::{Query, State},
    http::{Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::collections::HashMap;

const WELCOME: &str = "Welcome to basic-db. API endpoints live under /api.";

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub async fn dispatch(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body) = req.into_parts();

    // Outside the API prefix: static welcome payload, not an error.
    if !intent::is_api_path(parts.uri.path()) {
        return response::ok_message(WELCOME);
    }

    // 401 before any operation-specific logic runs.
    let principal = auth::authorize(&parts.headers, &state.auth);
    if principal == Principal::Anonymous {
        return AppError::Unauthenticated("a valid bearer credential is required".into())
            .into_response();
    }

    match handle(&state, principal, &parts.method, &parts.uri, body).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    }
}

async fn handle(
    state: &AppState,
    principal: Principal,
    method: &Method,
    uri: &Uri,
    body: Body,
) -> Result<Response, AppError> {
    let route = intent::resolve(method, uri.path())?;
    auth::require(principal, route.action(), route.operation())?;
    let store = state.store.as_ref();

    match route {
        Route::ApiIndex => Ok(response::ok_message(WELCOME)),

        Route::ListTables => {
            let names = SchemaManager::list_tables(store).await?;
            Ok(response::ok(json!(names)))
        }

        Route::CreateTable => {
            let body = read_json_body(body).await?;
            let table = body
                .get("tableName")
                .and_then(Value::as_str)
                .ok_or_else(|| AppError::BadRequest("'tableName' is required".into()))?;
            let c1_unique = body.get("c1Unique").and_then(Value::as_bool).unwrap_or(false);
            let outcomes = SchemaManager::create_table(store, table, c1_unique).await?;
            let all_ok = outcomes.iter().all(|o| o.ok);
            let data = json!({ "statements": outcomes });
            if all_ok {
                Ok(response::respond(
                    0,
                    Some(format!("table '{}' created", table)),
                    Some(data),
                    StatusCode::OK,
                ))
            } else {
                Ok(response::respond(
                    1,
                    Some(format!("table '{}' creation completed with errors", table)),
                    Some(data),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ))
            }
        }

        Route::DropTable { table } => {
            SchemaManager::drop_table(store, &table).await?;
            Ok(response::ok_message(format!("table '{}' dropped", table)))
        }

        Route::DropIndex { table, index } => {
            SchemaManager::drop_index(store, &table, &index).await?;
            Ok(response::ok_message(format!("index '{}' dropped", index)))
        }

        Route::InsertRecords { table } => {
            let fields = read_field_map(body).await?;
            let id = RecordService::insert(store, &table, &fields).await?;
            Ok(response::created(json!({ "id": id })))
        }

        // Selector precedence: c1 lookup, then range/pagination, then the
        // plain scan. An explicit id wins earlier by routing to GetRecord.
        Route::GetRecords { table } => {
            let params = query_map(uri)?;
            if let Some(c1) = params.get("c1") {
                let rows = RecordService::get_by_c1(store, &table, c1).await?;
                return Ok(response::ok(json!(rows)));
            }
            let filter = parse_filter(&params, true)?;
            let rows = RecordService::list(store, &table, &filter).await?;
            Ok(response::ok(json!(rows)))
        }

        Route::GetRecord { table, id } => {
            let id = parse_id(&id)?;
            match RecordService::get_by_id(store, &table, id).await? {
                Some(row) => Ok(response::ok(row)),
                None => Err(AppError::NotFound(format!(
                    "record {} not found in '{}'",
                    id, table
                ))),
            }
        }

        Route::UpdateRecord { table, id } => {
            let id = parse_id(&id)?;
            let fields = read_field_map(body).await?;
            // Zero rows changed is a legitimate outcome for update.
            let changed = RecordService::update(store, &table, id, &fields).await?;
            Ok(response::ok(json!({ "rowsChanged": changed })))
        }

        Route::DeleteRecord { table, id } => {
            let id = parse_id(&id)?;
            let changed = RecordService::delete(store, &table, id).await?;
            if changed == 0 {
                return Err(AppError::NotFound(format!(
                    "record {} not found in '{}'",
                    id, table
                )));
            }
            Ok(response::ok(json!({ "rowsChanged": changed })))
        }

        Route::Count { table } => {
            let params = query_map(uri)?;
            let filter = parse_filter(&params, false)?;
            let n = RecordService::count(store, &table, &filter).await?;
            Ok(response::ok(json!({ "count": n })))
        }

        Route::MaxId { table } => {
            let max = RecordService::max_id(store, &table).await?;
            Ok(response::ok(json!({ "maxId": max })))
        }
    }
}

fn query_map(uri: &Uri) -> Result<HashMap<String, String>, AppError> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(m)| m)
        .map_err(|_| AppError::BadRequest("invalid query string".into()))
}

fn parse_i64(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, AppError> {
    match params.get(key) {
        None => Ok(None),
        // `?min_id=` with no value reads as absent, not malformed.
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid {}: '{}'", key, raw))),
    }
}

fn parse_filter(
    params: &HashMap<String, String>,
    with_pagination: bool,
) -> Result<ListFilter, AppError> {
    let mut filter = ListFilter {
        min_id: parse_i64(params, "min_id")?,
        max_id: parse_i64(params, "max_id")?,
        limit: None,
        offset: None,
    };
    if with_pagination {
        filter.limit = parse_i64(params, "limit")?;
        filter.offset = parse_i64(params, "offset")?;
        for (key, value) in [("limit", filter.limit), ("offset", filter.offset)] {
            if value.is_some_and(|n| n < 0) {
                return Err(AppError::BadRequest(format!("invalid {}: negative", key)));
            }
        }
    }
    Ok(filter)
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: '{}'", raw)))
}

async fn read_json_body(body: Body) -> Result<Value, AppError> {
    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| AppError::BadRequest("unable to read request body".into()))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| AppError::BadRequest("request body must be valid JSON".into()))
}

async fn read_field_map(body: Body) -> Result<HashMap<String, Value>, AppError> {
    match read_json_body(body).await? {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
