//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_settlement::SettlementError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The trip's records cannot be settled as they stand
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", msg.clone()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::BadRequest(err.to_string()),
            PortError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            PortError::Connection { .. } | PortError::Timeout { .. } | PortError::ServiceUnavailable { .. } => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            PortError::Internal { .. } => {
                error!(error = %err, "Storage failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::Port(port) => port.into(),
            SettlementError::InvalidTripState(_)
            | SettlementError::UnknownMemberReference { .. }
            | SettlementError::InvalidRecord(_) => ApiError::Unprocessable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::MemberId;

    #[test]
    fn test_engine_errors_are_unprocessable() {
        let status = |e: SettlementError| ApiError::from(e).into_response().status();

        assert_eq!(
            status(SettlementError::invalid_state("trip has no members")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(SettlementError::UnknownMemberReference { member_id: MemberId::new() }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_port_errors_keep_their_meaning() {
        let status = |e: PortError| ApiError::from(SettlementError::from(e)).into_response().status();

        assert_eq!(status(PortError::not_found("Trip", "TRP-1")), StatusCode::NOT_FOUND);
        assert_eq!(
            status(PortError::ServiceUnavailable { service: "trip-store".to_string() }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status(PortError::internal("boom")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
