//! Media-stream wire protocol
//!
//! The provider opens a WebSocket to us and sends JSON text frames tagged
//! by an `event` field. Audio payloads are base64 mu-law and are relayed
//! without transcoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inbound frame from the telephony media stream
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyEvent {
    /// Socket-level hello, sent before `start`
    Connected,
    /// Handshake frame carrying the stream id and custom parameters
    Start { start: StartFrame },
    /// One chunk of caller audio
    Media { media: MediaFrame },
    /// The provider closed the stream
    Stop,
    #[serde(other)]
    Other,
}

/// Payload of the `start` handshake frame
#[derive(Debug, Clone, Deserialize)]
pub struct StartFrame {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
    #[serde(rename = "customParameters", default)]
    pub custom_parameters: HashMap<String, String>,
}

/// Payload of a `media` frame
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFrame {
    /// Base64-encoded audio
    pub payload: String,
}

/// Outbound `media` frame carrying agent audio back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMedia {
    event: &'static str,
    #[serde(rename = "streamSid")]
    stream_sid: String,
    media: OutboundPayload,
}

#[derive(Debug, Clone, Serialize)]
struct OutboundPayload {
    payload: String,
}

impl OutboundMedia {
    pub fn new(stream_sid: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            event: "media",
            stream_sid: stream_sid.into(),
            media: OutboundPayload {
                payload: payload.into(),
            },
        }
    }
}
