//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every error
//! body has the shape `{"error": <message>, "status": <code>}`.

use allergen_core::AnalysisError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested user or food was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A query parameter was malformed or out of range.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The event store or food catalog is unavailable.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NotFound { .. } => Self::NotFound(err.to_string()),
            AnalysisError::InvalidParameter { reason } => Self::InvalidQuery(reason),
            AnalysisError::UpstreamUnavailable { message } => Self::Unavailable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidQuery(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Upstream unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_statuses() {
        let cases = [
            (
                AnalysisError::NotFound {
                    entity: "user",
                    id: String::from("x"),
                },
                StatusCode::NOT_FOUND,
            ),
            (AnalysisError::invalid("bad"), StatusCode::BAD_REQUEST),
            (
                AnalysisError::UpstreamUnavailable {
                    message: String::from("down"),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
