use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid license key")]
    InvalidLicense,

    #[error("Daily limit reached, resets in ~{minutes_left} minutes")]
    DailyLimitReached { minutes_left: i64 },

    #[error("Cooldown active, wait {wait_seconds}s")]
    Cooldown { wait_seconds: u64 },

    #[error("Server misconfigured: {0}")]
    Misconfigured(String),

    #[error("License service error: {0}")]
    LicenseService(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::SessionStore(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Enter your access key to unlock".to_string(),
            ),
            AppError::InvalidLicense => (
                StatusCode::FORBIDDEN,
                "INVALID_LICENSE",
                "Invalid access key. Please check your key or contact support.".to_string(),
            ),
            AppError::DailyLimitReached { minutes_left } => (
                StatusCode::TOO_MANY_REQUESTS,
                "DAILY_LIMIT",
                format!("Daily limit reached. Resets in ~{minutes_left} minutes."),
            ),
            AppError::Cooldown { wait_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                "COOLDOWN",
                format!("Please wait {wait_seconds}s before generating again."),
            ),
            AppError::Misconfigured(msg) => {
                tracing::error!("Server misconfigured: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_MISCONFIGURED",
                    format!("Server misconfigured: {msg}. Contact support."),
                )
            }
            AppError::LicenseService(msg) => {
                tracing::error!("License service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LICENSE_SERVICE_ERROR",
                    "The license service could not be reached. Please try again.".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::SessionStore(msg) => {
                tracing::error!("Session store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SESSION_STORE_ERROR",
                    "A session storage error occurred".to_string(),
                )
            }
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
    async fn test_daily_limit_renders_minutes() {
        let (status, body) = body_json(AppError::DailyLimitReached { minutes_left: 42 }).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "DAILY_LIMIT");
        assert_eq!(
            body["error"]["message"],
            "Daily limit reached. Resets in ~42 minutes."
        );
    }

    #[tokio::test]
    async fn test_cooldown_renders_wait() {
        let (status, body) = body_json(AppError::Cooldown { wait_seconds: 3 }).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body["error"]["message"],
            "Please wait 3s before generating again."
        );
    }

    #[tokio::test]
    async fn test_session_store_error_hides_details() {
        let (status, body) =
            body_json(AppError::SessionStore("connection refused".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "SESSION_STORE_ERROR");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }
}
