// ABOUTME: Status verification endpoint
// ABOUTME: Cross-checks daemon key knowledge, configured device URL, and physical device presence

use crate::api::error::ApiError;
use crate::api::http::daemon_response;
use crate::state::GatewayState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use gateway_core::sanitize;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub device_url: Option<String>,
}

/// GET /statusz/:pubkey?device_url=...
///
/// Returns 200 iff all three checks hold: the daemon knows the key,
/// the locally configured device URL matches the caller-supplied one,
/// and exactly one unlocked signer device is attached. Checks run in
/// that order and short-circuit; any single failure fails the whole
/// status, never a partial success.
pub async fn statusz(
    State(state): State<Arc<GatewayState>>,
    Path(pubkey): Path<String>,
    Query(params): Query<StatusParams>,
) -> Result<Response, ApiError> {
    let pubkey = sanitize::path_component(&pubkey);
    let caller_url = params
        .device_url
        .ok_or_else(|| ApiError::bad_request("Missing device_url query parameter"))?;

    // The daemon key query and the USB scan both touch the signer
    // session, so the whole check runs under the exclusivity lock.
    let _guard = state.signer_lock.lock().await;

    let reply = state.daemon.get(&format!("keys/{}", pubkey)).await?;
    if !reply.is_success() {
        // The daemon's own verdict and body, verbatim.
        return Ok(daemon_response(reply));
    }

    let configured = state.config.configured_device_url().await.map_err(|err| {
        tracing::error!("configuration check failed: {}", err);
        ApiError::internal("Signer configuration missing or unreadable, check gateway logs")
    })?;
    let configured = sanitize::device_url(&configured);
    let requested = sanitize::device_url(&caller_url);
    if configured != requested {
        tracing::warn!(
            %configured,
            %requested,
            "device URL configured on the signer does not match the one supplied by the caller"
        );
        return Err(ApiError::internal(
            "Device URL mismatch, check gateway logs on the signer",
        ));
    }

    if !state.device.is_signer_ready().await {
        tracing::warn!(key = %pubkey, "signer device absent, locked, or ambiguous");
        return Err(ApiError::internal(
            "Signer device not connected or not unlocked",
        ));
    }

    // All three checks passed; relay the daemon's answer rather than
    // inventing a success body.
    Ok(daemon_response(reply))
}
