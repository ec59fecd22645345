//! Standard response envelope. Every endpoint outcome goes through
//! [`respond`] so all responses share one structure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// `code` 0 is success, nonzero is failure. `message` and `data` are left
/// out of the body entirely when absent, never serialized as null.
#[derive(Serialize, Debug)]
pub struct Envelope {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The single envelope constructor.
pub fn respond(
    code: i64,
    message: Option<String>,
    data: Option<Value>,
    status: StatusCode,
) -> Response {
    (status, Json(Envelope { code, message, data })).into_response()
}

pub fn ok(data: Value) -> Response {
    respond(0, None, Some(data), StatusCode::OK)
}

pub fn ok_message(message: impl Into<String>) -> Response {
    respond(0, Some(message.into()), None, StatusCode::OK)
}

pub fn created(data: Value) -> Response {
    respond(0, None, Some(data), StatusCode::CREATED)
}

pub fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    respond(1, Some(message.into()), None, status)
}

/// Failure with raw collaborator detail under `data.details` for diagnosability.
pub fn fail_with_details(status: StatusCode, message: impl Into<String>, details: Value) -> Response {
    respond(
        1,
        Some(message.into()),
        Some(serde_json::json!({ "details": details })),
        status,
    )
}
