//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Call once at startup, before any metric is recorded. Fails if another
/// recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// `/translate` requests received (counter).
pub const TRANSLATE_REQUESTS_TOTAL: &str = "translate_requests_total";
/// Failed pipeline runs (counter, labels: kind).
pub const PIPELINE_FAILURES_TOTAL: &str = "pipeline_failures_total";
/// Runs that recognized no speech (counter).
pub const PIPELINE_NO_SPEECH_TOTAL: &str = "pipeline_no_speech_total";
/// Broadcast passes (counter).
pub const BROADCASTS_TOTAL: &str = "broadcasts_total";
/// Subscribers dropped after a failed send (counter).
pub const BROADCAST_PRUNED_TOTAL: &str = "broadcast_pruned_total";
/// Live subscribers (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
