//! Prometheus metrics handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    describe_metrics();
    handle
}

/// Describe the metrics this service emits
pub fn describe_metrics() {
    describe_counter!(
        "calls_routed_total",
        "Inbound calls by routing outcome (ai, fallback, rejected)"
    );
    describe_counter!(
        "bridge_sessions_total",
        "Media bridge sessions by final outcome"
    );
    describe_counter!(
        "media_frames_total",
        "Audio frames relayed across the bridge by direction"
    );
    describe_counter!(
        "status_callbacks_total",
        "Provider status callbacks by reported status"
    );
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}
