//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - LPR scan ingestion (`POST /entrance_LPR`)
//! - Read-only views over vehicles, spaces and stays
//! - WebSocket endpoint for RealtimeHub
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_connected = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    let response = HealthResponse {
        status: if db_connected { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db_connected,
        observers: state.realtime.connection_count(),
    };

    Json(response)
}

/// Status endpoint
pub async fn device_status(State(state): State<AppState>) -> impl IntoResponse {
    let pipeline = state.scan_pipeline.config();
    Json(json!({
        "device_type": "lpr-parking",
        "firmware_version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "scan_timeout_ms": pipeline.scan_timeout.as_millis() as u64,
        "fallback_release_any": pipeline.fallback_release_any,
    }))
}
