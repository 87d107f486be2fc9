// ABOUTME: Router assembly for the gateway
// ABOUTME: Dispatches status, health, and sign paths; everything else falls through to the daemon

use crate::api::http::{forward, health, sign, status};
use crate::state::GatewayState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Build the gateway router with explicit state - the proper way to
/// structure an Axum app.
pub fn routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/statusz/:pubkey", get(status::statusz))
        .route("/healthz", get(health::healthz))
        .route("/keys/:pubkey", post(sign::sign))
        .fallback(forward::forward_any)
        .with_state(state)
}
