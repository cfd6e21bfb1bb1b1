//! Media-stream WebSocket upgrade
//!
//! The provider connects here after receiving a connect-stream control
//! document. Each accepted socket gets its own bridge run; bridge failures
//! never escape the spawned task.

use super::webhook_handler::AppState;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use tracing::info;

/// Upgrade the provider connection and hand it to the media bridge
pub async fn media_stream(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    info!("Media stream connection requested");
    let bridge = state.bridge.clone();
    ws.on_upgrade(move |socket| async move {
        bridge.run(socket).await;
    })
}
