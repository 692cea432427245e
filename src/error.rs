use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub use crate::domain::shared::error_dto::ErrorResponse;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimitExceeded(String),

    #[error("{message}: {details}")]
    ExternalService { message: String, details: String },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::ExternalService { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert to the client-visible error body.
    ///
    /// Database failures never leak driver text; provider failures carry the
    /// upstream message in `details` for diagnostics.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Database(_) => ErrorResponse::new("Internal server error"),
            Self::ExternalService { message, details } => {
                ErrorResponse::with_details(message, details)
            }
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::RateLimitExceeded(msg)
            | Self::Internal(msg) => ErrorResponse::new(msg),
        }
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                status = %status.as_u16(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = %status.as_u16(),
                "Request rejected"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
