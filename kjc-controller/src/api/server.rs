//! HTTP server setup and routing

use crate::controller::Controller;
use crate::error::{Error, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub controller: Controller,
}

/// Build the router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        // Playback
        .route("/play", post(super::handlers::play))
        .route("/control", post(super::handlers::control))
        .route("/status", get(super::handlers::status))
        // Configuration
        .route(
            "/volume",
            get(super::handlers::get_volume).post(super::handlers::set_volume),
        )
        .route(
            "/sync_offset",
            get(super::handlers::get_sync_offset).post(super::handlers::set_sync_offset),
        )
        // Display client
        .route("/client/ready", post(super::handlers::client_ready))
        .route("/events", get(super::sse::event_stream))
        .fallback(super::handlers::not_found)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the API until `shutdown` resolves
pub async fn run(
    ctx: AppContext,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
