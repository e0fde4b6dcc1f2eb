use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::sources::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant maps to exactly one status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Monthly generation limit reached ({used}/{allowance})")]
    QuotaExceeded { used: i32, allowance: i32 },

    #[error("Rate limited: {reason}")]
    RateLimited { reason: String },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Rate limiter error: {0}")]
    RateLimiter(#[from] redis::RedisError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(ExtractError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(ExtractError::Fetch { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::RateLimiter(_)
            | AppError::Llm(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => ("UNAUTHORIZED", "Authentication required".to_string()),
            AppError::QuotaExceeded { used, allowance } => (
                "QUOTA_EXCEEDED",
                format!(
                    "You have used {used} of {allowance} generations this month. \
                    Upgrade your plan or wait for the next billing cycle."
                ),
            ),
            AppError::RateLimited { .. } => (
                "RATE_LIMITED",
                "Too many requests. Please slow down.".to_string(),
            ),
            AppError::PayloadTooLarge(msg) => ("PAYLOAD_TOO_LARGE", msg.clone()),
            AppError::Extraction(ExtractError::TooLarge(msg)) => {
                ("PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Extraction(e @ ExtractError::Fetch { .. }) => {
                tracing::error!("Upstream fetch failed: {e}");
                ("UPSTREAM_ERROR", e.to_string())
            }
            AppError::Extraction(e) => ("EXTRACTION_ERROR", e.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
            AppError::RateLimiter(e) => {
                tracing::error!("Rate limiter error: {e}");
                (
                    "RATE_LIMITER_ERROR",
                    "The rate limiter is unavailable".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let AppError::RateLimited { reason } = &self {
            body["reason"] = json!(reason);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_quota_exceeded_is_403() {
        let (status, body) = body_json(AppError::QuotaExceeded {
            used: 10,
            allowance: 10,
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");
    }

    #[tokio::test]
    async fn test_rate_limited_is_429_with_reason() {
        let (status, body) = body_json(AppError::RateLimited {
            reason: "Try again in 12s".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["reason"], "Try again in 12s");
    }

    #[tokio::test]
    async fn test_too_large_keeps_measured_message() {
        let (status, body) = body_json(AppError::PayloadTooLarge(
            "PDF has 101 pages; the maximum is 100".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"]["message"].as_str().unwrap().contains("101"));
    }

    #[tokio::test]
    async fn test_extraction_errors_split_between_400_and_500() {
        let (status, _) = body_json(AppError::Extraction(ExtractError::NoTranscript)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = body_json(AppError::Extraction(ExtractError::Fetch {
            upstream: "web page".to_string(),
            message: "connection refused".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_llm_error_hides_details() {
        let (status, body) = body_json(AppError::Llm("secret stack".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("secret"));
    }

    #[test]
    fn test_duration_violation_maps_to_413() {
        let err = AppError::Extraction(ExtractError::TooLarge("too long".to_string()));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
