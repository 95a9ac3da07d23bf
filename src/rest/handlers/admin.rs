//! Admin Handlers
//!
//! Health check endpoint.

use std::sync::Arc;

use axum::{Extension, Json};

use crate::app::App;
use crate::rest::dto::{HealthData, HealthResponse};

/// Health check endpoint
pub async fn health(Extension(app): Extension<Arc<App>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        data: HealthData {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: app.uptime_seconds(),
            operations: app.total_operations(),
        },
    })
}
