//! Liveness and metrics endpoints for the hosting platform.

use crate::services::metrics;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use service_core::error::AppError;
use tower_http::trace::TraceLayer;

pub const ALIVE_MESSAGE: &str = "Goku Bot is alive and running!";

async fn alive() -> &'static str {
    ALIVE_MESSAGE
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "bot": "goku",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

async fn metrics_endpoint() -> Result<impl IntoResponse, AppError> {
    let body = metrics::render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to render metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}

async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("no such route"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}
