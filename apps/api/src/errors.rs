use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Malformed input to the matching engine. Empty input and degenerate
/// vocabularies are not errors; this is the only failure the engine returns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("invalid n-gram range ({min_n}, {max_n})")]
    InvalidNgramRange { min_n: usize, max_n: usize },

    #[error("vocabulary cap must be at least 1")]
    ZeroMaxFeatures,

    #[error("exact-match bonus {0} outside 0..=100")]
    InvalidBonus(f64),

    #[error("candidate {index} carries {found}, expected {expected}")]
    MismatchedCandidate {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid match input: {0}")]
    Match(#[from] MatchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Match(e) => (StatusCode::BAD_REQUEST, "INVALID_MATCH_INPUT", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
