// ABOUTME: API error type shared by all gateway handlers
// ABOUTME: Fails with human-readable diagnostic text, never internal paths or traces

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway_core::daemon::DaemonError;

/// A handler failure surfaced to the caller as plain diagnostic text.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            message: message.into(),
        }
    }
}

impl From<DaemonError> for ApiError {
    fn from(err: DaemonError) -> Self {
        tracing::error!("daemon call failed: {}", err);
        match err {
            DaemonError::Timeout(_) => Self::gateway_timeout("Signing daemon timed out"),
            DaemonError::Unreachable(_) => Self::bad_gateway("Signing daemon unreachable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
