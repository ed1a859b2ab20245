use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Machine-readable error code string.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!("API internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "code": code,
            "message": message,
            // Keep legacy "error" field for backwards compatibility
            "error": message,
            "details": Value::Null,
        });

        (status, Json(body)).into_response()
    }
}

impl From<ballot_core::error::CoreError> for ApiError {
    fn from(e: ballot_core::error::CoreError) -> Self {
        use ballot_core::error::CoreError;
        match e {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::InvalidCredentials => ApiError::Unauthorized,
            CoreError::NotFound => ApiError::NotFound,
            CoreError::Forbidden => ApiError::Forbidden,
            CoreError::InactivePoll => ApiError::BadRequest("Poll is not active".into()),
            CoreError::InvalidOption => {
                ApiError::BadRequest("Invalid option for this poll".into())
            }
            CoreError::DuplicateVote => {
                ApiError::BadRequest("You have already voted on this poll".into())
            }
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::Timeout => ApiError::ServiceUnavailable("store timed out".into()),
            // Wrap the source so the tracing line keeps the store's detail;
            // the response body stays generic either way.
            CoreError::Database(e) => ApiError::Internal(anyhow::Error::new(e)),
            CoreError::Internal(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<ballot_db::DbError> for ApiError {
    fn from(e: ballot_db::DbError) -> Self {
        match e {
            ballot_db::DbError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}
