//! Prometheus recorder plus the chatbot counters.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global recorder. Called once from `main`.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| AppError::InternalError(anyhow::anyhow!("metrics already initialized")))
}

/// Rendered for `GET /metrics`.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

fn upsert_outcome(created: bool) -> &'static str {
    if created {
        "created"
    } else {
        "updated"
    }
}

pub fn record_upsert(created: bool) {
    metrics::counter!("chatbot_upserts_total", "outcome" => upsert_outcome(created)).increment(1);
}

/// Reads answered with defaults because the owner has no stored record.
pub fn record_default_served() {
    metrics::counter!("chatbot_default_served_total").increment(1);
}
