//! HTTP dispatch: one handler for the whole surface.

mod api;

pub use api::dispatch;
