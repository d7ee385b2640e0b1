//! API Routes

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::models::ApiResponse;
use crate::scan_pipeline::payload::scan_response;
use crate::state::AppState;

/// Default / maximum rows for history listings
const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/status", get(super::device_status))
        // LPR ingestion
        .route("/entrance_LPR", post(entrance_lpr))
        // Vehicles
        .route("/api/vehicles/:plate", get(get_vehicle))
        // Parking spaces
        .route("/api/parking-spaces", get(list_parking_spaces))
        .route("/api/parking-spaces/summary", get(parking_space_summary))
        .route("/api/parking-spaces/integrity", get(parking_space_integrity))
        // Histories
        .route("/api/histories", get(list_histories))
        .route("/api/histories/active", get(list_active_histories))
        // WebSocket
        .route("/api/ws", get(websocket_handler))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Not found")),
    )
}

// ========================================
// LPR Ingestion
// ========================================

/// Body posted by the capture client
#[derive(Debug, Deserialize)]
struct ScanRequest {
    #[serde(default)]
    license_plate: String,
}

/// Process one recognised plate
async fn entrance_lpr(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<impl IntoResponse, crate::Error> {
    tracing::debug!(license_plate = %req.license_plate, "LPR scan received");
    let outcome = state.scan_pipeline.process(&req.license_plate, Utc::now()).await?;
    Ok(Json(scan_response(&outcome)))
}

// ========================================
// Vehicle Handlers
// ========================================

async fn get_vehicle(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<impl IntoResponse, crate::Error> {
    let vehicle = state
        .vehicle_registry
        .get_by_plate(plate.trim())
        .await?
        .ok_or_else(|| crate::Error::NotFound(format!("Vehicle {} is not registered", plate)))?;
    Ok(Json(ApiResponse::success(vehicle)))
}

// ========================================
// Parking Space Handlers
// ========================================

async fn list_parking_spaces(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, crate::Error> {
    let spaces = state.parking_spaces.list_all().await?;
    Ok(Json(ApiResponse::success(spaces)))
}

async fn parking_space_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, crate::Error> {
    let summary = state.parking_spaces.occupancy_summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Spaces whose occupied flag disagrees with open stays
async fn parking_space_integrity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, crate::Error> {
    let mismatches = state.parking_spaces.integrity_report().await?;
    Ok(Json(ApiResponse::success(mismatches)))
}

// ========================================
// History Handlers
// ========================================

/// Query parameters for history listing
#[derive(Debug, Deserialize)]
struct HistoryQuery {
    license_plate: Option<String>,
    limit: Option<u32>,
}

async fn list_histories(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, crate::Error> {
    let plate = query
        .license_plate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| crate::Error::Validation("license_plate is required".to_string()))?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let stays = state.history_ledger.list_by_plate(plate, limit).await?;
    Ok(Json(ApiResponse::success(stays)))
}

async fn list_active_histories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, crate::Error> {
    let stays = state.history_ledger.list_active().await?;
    Ok(Json(ApiResponse::success(stays)))
}

// ========================================
// WebSocket Handler
// ========================================

/// WebSocket upgrade handler
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (conn_id, mut rx) = state.realtime.register().await;

    // Hub -> client
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Clients only listen; inbound frames are drained until close
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
        conn_id
    });

    let conn_id = tokio::select! {
        _ = send_task => conn_id,
        result = recv_task => result.unwrap_or(conn_id),
    };

    state.realtime.unregister(&conn_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use sqlx::mysql::MySqlPoolOptions;

    fn lazy_state() -> AppState {
        let config = AppConfig {
            database_url: "mysql://root@127.0.0.1:1/parking".to_string(),
            port: 5000,
            host: "127.0.0.1".to_string(),
            db_max_connections: 1,
            db_acquire_timeout_sec: 1,
            scan_timeout_ms: 500,
            fallback_release_any: false,
        };
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::new(pool, config)
    }

    #[test]
    fn test_missing_plate_defaults_to_empty() {
        let req: ScanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.license_plate, "");
    }

    #[tokio::test]
    async fn test_empty_plate_goes_to_registry_lookup() {
        // an empty plate is a lookup like any other; with the database
        // unreachable it fails as infrastructure, never as a bad request
        let state = lazy_state();
        let req = ScanRequest {
            license_plate: "  ".to_string(),
        };
        let response = entrance_lpr(State(state), Json(req)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_history_query_requires_plate() {
        let state = lazy_state();
        let query = HistoryQuery {
            license_plate: None,
            limit: Some(10),
        };
        let response = list_histories(State(state), Query(query)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
