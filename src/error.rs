//! Typed errors and HTTP mapping.

use crate::response;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(&'static str),
    #[error("empty credential in {0}")]
    EmptyCredential(&'static str),
}

/// Failure surfaced by the store collaborator while executing a statement.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("method not allowed for {0}")]
    MethodNotAllowed(String),
    #[error("{context}")]
    Store {
        context: String,
        source: StoreError,
    },
}

impl AppError {
    /// Wrap a store failure with operation context (which table/index, which step).
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        AppError::Store {
            context: context.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated(msg) => response::fail(StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => response::fail(StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => response::fail(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => response::fail(StatusCode::NOT_FOUND, msg),
            AppError::MethodNotAllowed(path) => response::fail(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("method not allowed for {}", path),
            ),
            AppError::Store { context, source } => {
                tracing::error!(context = %context, error = %source, "store operation failed");
                response::fail_with_details(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    context,
                    serde_json::Value::String(source.to_string()),
                )
            }
            AppError::Config(e) => response::fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}
