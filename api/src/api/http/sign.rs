// ABOUTME: Signing endpoint
// ABOUTME: Forwards sign requests to the daemon under the signer exclusivity lock

use crate::api::error::ApiError;
use crate::api::http::daemon_response;
use crate::state::GatewayState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use gateway_core::sanitize;
use std::sync::Arc;

/// POST /keys/:pubkey
///
/// Signing drives the hardware device, so the forward holds the signer
/// lock end to end. The daemon's reply is re-encoded as JSON when it
/// parses, and passed through verbatim when it does not.
pub async fn sign(
    State(state): State<Arc<GatewayState>>,
    Path(pubkey): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let pubkey = sanitize::path_component(&pubkey);
    tracing::info!(key = %pubkey, payload_bytes = body.len(), "sign request");

    let _guard = state.signer_lock.lock().await;
    let reply = state
        .daemon
        .post(&format!("keys/{}", pubkey), body.to_vec())
        .await?;
    if !reply.is_success() {
        tracing::warn!(key = %pubkey, status = reply.status, "daemon refused sign request");
    }
    Ok(daemon_response(reply))
}
