// ABOUTME: Composite health report endpoint
// ABOUTME: Network probes, wall-power sensing, and metrics passthrough in one text exposition

use crate::state::GatewayState;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// GET /healthz
///
/// Always produces the full report: four labeled gauges plus the
/// passthrough metrics text. A failing probe degrades its own line to
/// a sentinel value; it never aborts the report.
pub async fn healthz(State(state): State<Arc<GatewayState>>) -> Response {
    // The whole report waits for any in-flight device operation: the
    // signer cannot multiplex, and the power sense line sits in its
    // enclosure. The probes stay concurrent with each other under the
    // lock, just never with a sign forward or status check.
    let _guard = state.signer_lock.lock().await;

    let wired = state.prober.ping(&state.health.wired_interface);
    let wireless = state.prober.ping(&state.health.wireless_interface);
    let scrape = state.metrics.scrape();
    let (wired, wireless, scrape) = tokio::join!(wired, wireless, scrape);

    let power = state.power.read().await;

    let (scrape_failed, passthrough) = match scrape {
        Ok(text) => (0, text),
        Err(err) => {
            tracing::warn!("metrics passthrough failed: {}", err);
            (1, String::new())
        }
    };

    let report = format!(
        "# HELP wired_network Status of the wired network. 0 if it can reach the probe target. 1 if it cannot.\n\
         # TYPE wired_network gauge\n\
         wired_network {wired}\n\
         # HELP wireless_network Status of the wireless backup connection.\n\
         # TYPE wireless_network gauge\n\
         wireless_network {wireless}\n\
         # HELP power State of the wall power for the signer. 0 means wall power, anything else means battery.\n\
         # TYPE power gauge\n\
         power {power}\n\
         # HELP node_exporter_scrape Whether the metrics passthrough fetch succeeded. 0 means success.\n\
         # TYPE node_exporter_scrape gauge\n\
         node_exporter_scrape {scrape_failed}\n\
         {passthrough}\n"
    );

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        report,
    )
        .into_response()
}
