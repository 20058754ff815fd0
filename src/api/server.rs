use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{detect_handler, health_handler};
use crate::config::ServerConfig;
use crate::detector::Detector;

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Detector>,
}

pub fn router(detector: Detector, max_upload_bytes: usize) -> Router {
    let state = AppState {
        detector: Arc::new(detector),
    };

    Router::new()
        .route("/detect", post(detect_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(detector: Detector, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        capability = ?detector.capability(),
        "card detector listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, router(detector, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
