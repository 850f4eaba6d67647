use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Not configured: {0}")]
    PreconditionFailed(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Content refused: {0}")]
    UnprocessableContent(String),

    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Bad upstream response: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body: human message plus a stable category code
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub category: String,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UnprocessableContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamAuth(_) | Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::PreconditionFailed(_) => "unconfigured",
            Self::RateLimitExceeded(_) => "quota_exhausted",
            Self::UnprocessableContent(_) => "content_policy",
            Self::UpstreamAuth(_) => "authentication",
            Self::ExternalService(_) => "provider_unavailable",
            Self::BadGateway(_) => "empty_result",
            Self::Internal(_) => "internal",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.to_string(),
            category: self.category().to_string(),
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
                category = self.category(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = %status.as_u16(),
                category = self.category(),
                "Request rejected"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
