use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;

/// Request-level failures. Every variant renders as `{"message": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        AppError::Auth(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(msg)
            | AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            AppError::Internal(ref e) => {
                tracing::error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::auth("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(DbError::NotInitialized).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(DbError::Timeout(Duration::from_secs(1))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn server_errors_hide_internal_text() {
        use http_body_util::BodyExt;

        let response = AppError::from(DbError::NotFound("/secret/path.db".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert!(!String::from_utf8_lossy(&bytes).contains("secret"));
    }
}
