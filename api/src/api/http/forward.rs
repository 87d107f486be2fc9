// ABOUTME: Catch-all pass-through to the signing daemon
// ABOUTME: Relays unknown paths verbatim so new daemon endpoints need no gateway change

use crate::api::error::ApiError;
use crate::api::http::daemon_response;
use crate::state::GatewayState;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::Response;
use std::sync::Arc;

/// Fallback for every path the gateway does not handle itself: forward
/// the same method, path, query, and body to the daemon and relay its
/// answer unmodified.
pub async fn forward_any(
    State(state): State<Arc<GatewayState>>,
    req: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    // The body arrives as a stream (chunked framing included); collect
    // it fully so the daemon sees one well-formed payload.
    let bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|err| {
        tracing::error!("failed to read request body: {}", err);
        ApiError::bad_request("Unreadable request body")
    })?;

    let method = parts.method;
    let write = method != Method::GET && method != Method::HEAD;
    if write {
        tracing::info!(%method, path = %path_and_query, payload_bytes = bytes.len(), "forwarding write request");
    }

    // Write methods can reach the hardware device through the daemon;
    // they queue behind the signer lock like any other device work.
    let reply = if write {
        let _guard = state.signer_lock.lock().await;
        state
            .daemon
            .forward(method, &path_and_query, Some(bytes.to_vec()))
            .await?
    } else {
        state.daemon.forward(method, &path_and_query, None).await?
    };

    if !reply.is_success() {
        tracing::warn!(path = %path_and_query, status = reply.status, "daemon returned non-success, passing through");
    }
    Ok(daemon_response(reply))
}
