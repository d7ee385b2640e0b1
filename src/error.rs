//! Error handling for the LPR parking server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not found (read endpoints only, an unregistered scan is not an error)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Scan transaction exceeded its time budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// More than one open stay for a vehicle
    #[error("Data integrity fault: {0}")]
    DataIntegrity(String),

    /// Close race guard: the history record already has an exit time
    #[error("History record {0} is already closed")]
    AlreadyClosed(i64),

    /// Claim race guard: the parking space is already occupied
    #[error("Parking space {0} is already occupied")]
    AlreadyOccupied(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Status code and machine-readable code for the response body
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            Error::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TIMEOUT"),
            Error::DataIntegrity(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATA_INTEGRITY_FAULT"),
            Error::AlreadyClosed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ALREADY_CLOSED"),
            Error::AlreadyOccupied(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ALREADY_OCCUPIED"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error_code = %error_code,
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                status = %status,
                error_code = %error_code,
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": message,
            "error_code": error_code
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        for err in [
            Error::Database("down".to_string()),
            Error::Timeout("scan".to_string()),
            Error::DataIntegrity("two open stays".to_string()),
            Error::AlreadyClosed(7),
            Error::AlreadyOccupied(3),
            Error::Internal("history id out of range".to_string()),
        ] {
            assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_every_variant_has_its_own_code() {
        let codes: std::collections::HashSet<_> = [
            Error::NotFound("vehicle".to_string()),
            Error::Validation("license_plate".to_string()),
            Error::Database("down".to_string()),
            Error::Timeout("scan".to_string()),
            Error::DataIntegrity("two open stays".to_string()),
            Error::AlreadyClosed(7),
            Error::AlreadyOccupied(3),
            Error::Internal("id".to_string()),
        ]
        .iter()
        .map(|e| e.status_and_code().1)
        .collect();
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = Error::Validation("license_plate is empty".to_string());
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));
    }

    #[test]
    fn test_race_guard_messages() {
        assert_eq!(
            Error::AlreadyOccupied(3).to_string(),
            "Parking space 3 is already occupied"
        );
        assert_eq!(
            Error::AlreadyClosed(12).to_string(),
            "History record 12 is already closed"
        );
    }
}
