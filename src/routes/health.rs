// ABOUTME: Health check route for monitoring and load balancers
// ABOUTME: Reports liveness only; no dependency probing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Health check route.

use crate::server::ServerContext;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

/// Health check routes
pub fn router() -> Router<ServerContext> {
    Router::new().route("/health", get(health_handler))
}

// Handler signatures must be async for axum routing
#[allow(clippy::unused_async)]
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
