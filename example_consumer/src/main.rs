//! Example consumer: wires the gateway to a PostgreSQL pool and serves it.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use basic_db::{gateway_router, AppState, GatewayConfig, PgStore};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("basic_db=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/basic_db".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let config = GatewayConfig::from_env()?;
    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        auth: config.auth_tokens(),
    };

    let app = gateway_router(state);
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
