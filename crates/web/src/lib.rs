//! Web front end for the Curie research assistant.
//!
//! # Endpoints
//!
//! - `GET /` - Research form
//! - `POST /report` - Submit the form and render the report
//! - `POST /api/v1/report` - Generate a report from JSON
//! - `GET /health` - Health check
//!
//! # Architecture
//!
//! ```text
//! Browser / API client
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   Web server    │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐      ┌─────────────────┐
//! │ ReportGenerator │ ───► │   Agent team    │
//! └─────────────────┘      └─────────────────┘
//! ```

pub mod config;
pub mod page;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::AppConfig;
pub use state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/report", post(routes::submit_report))
        .route("/api/v1/report", post(routes::api_report))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_until(state, listener, shutdown_signal()).await
}

/// Serve on `listener` until `signal` resolves, then stop the agents'
/// tool servers.
pub async fn serve_until<F>(
    state: Arc<AppState>,
    listener: tokio::net::TcpListener,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "Starting Curie web server");

    let served = axum::serve(listener, create_router(state.clone()))
        .with_graceful_shutdown(signal)
        .await;

    state.generator.shutdown().await;
    served?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
