//! Router assembly. Every request funnels through the single dispatch
//! handler so all outcomes, including 404/405, carry the response
//! envelope.

pub mod intent;

use crate::handlers::dispatch;
use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn gateway_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
