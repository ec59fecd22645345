//! basic-db: a generic HTTP-to-SQL gateway.
//!
//! Callers create tables that all share one fixed column template, then run
//! CRUD and metadata operations (count, max id, filtered pagination) over
//! REST without ever writing SQL. Every outcome, success or failure, is
//! rendered through the `{code, message, data}` envelope.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{authorize, Action, AuthTokens, Principal};
pub use config::GatewayConfig;
pub use error::{AppError, ConfigError, StoreError};
pub use response::{respond, Envelope};
pub use routes::gateway_router;
pub use schema::{SchemaManager, StatementOutcome, SCHEMA_VERSION};
pub use service::RecordService;
pub use state::AppState;
pub use store::{ExecOutcome, PgStore, Store};
