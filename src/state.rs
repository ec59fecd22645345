//! Shared application state for the dispatch handler.

use crate::auth::AuthTokens;
use crate::store::Store;
use std::sync::Arc;

/// Read-only per-process state: the store handle and the two configured
/// credentials. Nothing here is mutated at runtime, so requests share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthTokens,
}
