//! API Router configuration

use super::media_ws::media_stream;
use super::metrics_handler::metrics_handler;
use super::webhook_handler::{
    ai_handoff, call_status, health_check, incoming_call, recording_complete, recording_status,
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Health check route (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    // Telephony webhook routes
    let webhook_routes = Router::new()
        .route("/webhooks/twilio/incoming-call", post(incoming_call))
        .route("/webhooks/twilio/call-status", post(call_status))
        .route("/webhooks/twilio/recording-complete", post(recording_complete))
        .route("/webhooks/twilio/recording-status", post(recording_status))
        .route("/webhooks/twilio/ai-handoff", post(ai_handoff))
        .route("/webhooks/twilio/ai-media-stream", get(media_stream));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(health_routes)
        .merge(webhook_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
