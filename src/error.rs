use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const INVALID_UPSTREAM_MESSAGE: &str = "Invalid response from server";
pub const UNREACHABLE_MESSAGE: &str = "Unable to connect to backend service";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidUpstreamResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() || value.is_timeout() || value.is_request() {
            AppError::UpstreamUnreachable(value.to_string())
        } else {
            AppError::Internal(value.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Only the unauthorized message is caller-facing; the rest stay in the logs.
        let message = match self {
            AppError::Unauthorized(msg) => msg,
            AppError::InvalidUpstreamResponse(_) => INVALID_UPSTREAM_MESSAGE.to_string(),
            AppError::UpstreamUnreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        };

        let body = axum::Json(ErrorResponse { message });
        (status, body).into_response()
    }
}
