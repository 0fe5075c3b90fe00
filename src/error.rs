use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use common::{ApiResponse, Issue};
use compute::error::ComputeError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers.
///
/// Every variant is rendered as the standard response envelope with the
/// message in `errorMessage`; `Forbidden` may also carry a structured issue
/// in `errorResult`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Forbidden { message: String, issue: Option<Issue> },

    #[error("{0}")]
    NotFound(String),

    /// Store failure, reported to the client with the database message
    #[error("{0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            issue: None,
        }
    }

    pub fn forbidden_with_issue(message: impl Into<String>, issue: Issue) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            issue: Some(issue),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::Database(db_err) => ApiError::Database(db_err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let message = self.to_string();
        let issues = match self {
            ApiError::Forbidden { issue: Some(issue), .. } => vec![issue],
            _ => Vec::new(),
        };

        let body: ApiResponse<()> = ApiResponse::failure(message, issues);
        (status, Json(body)).into_response()
    }
}

/// Result type returned by handlers.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// True when the store rejected a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
