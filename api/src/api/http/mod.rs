pub mod forward;
pub mod health;
pub mod routes;
pub mod sign;
pub mod status;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use gateway_core::daemon::{DaemonBody, DaemonReply};

/// Relays a daemon reply to the caller: structured bodies are
/// re-encoded as JSON, raw bodies pass through verbatim, and the
/// daemon's own status code is preserved either way.
pub(crate) fn daemon_response(reply: DaemonReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match reply.body {
        DaemonBody::Structured(value) => (status, Json(value)).into_response(),
        DaemonBody::Raw(bytes) => {
            tracing::warn!(
                bytes = bytes.len(),
                "daemon reply is not valid JSON, passing through verbatim"
            );
            (status, bytes).into_response()
        }
    }
}
