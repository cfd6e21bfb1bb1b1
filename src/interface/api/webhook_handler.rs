//! Telephony webhook handlers
//!
//! The provider posts form-encoded payloads and expects either a control
//! document (XML) or a bare acknowledgement. Callback handlers always
//! acknowledge: a failure on our side must not make the provider retry
//! forever.

use crate::application::inbound::{InboundCallService, IncomingCall};
use crate::application::status::{CallStatusService, RecordingCallback, StatusCallback};
use crate::infrastructure::media::MediaBridge;
use crate::infrastructure::telephony::signature;
use crate::infrastructure::telephony::twiml::VoiceInstruction;
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state for all webhook handlers
#[derive(Clone)]
pub struct AppState {
    pub inbound: Arc<InboundCallService>,
    pub status: Arc<CallStatusService>,
    pub bridge: MediaBridge,
    /// Signature validation key; `None` disables validation
    pub signature_key: Option<String>,
    pub public_host: String,
}

impl AppState {
    /// Check the provider signature when validation is configured
    fn signature_ok(&self, headers: &HeaderMap, path: &str, form: &HashMap<String, String>) -> bool {
        let Some(key) = &self.signature_key else {
            return true;
        };

        let provided = headers
            .get("X-Twilio-Signature")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let url = format!("https://{}{}", self.public_host, path);

        if signature::validate(key, &url, form, provided) {
            true
        } else {
            warn!(path, "Rejected webhook with bad signature");
            false
        }
    }
}

fn xml_response(instruction: VoiceInstruction) -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        instruction.to_xml(),
    )
        .into_response()
}

fn field(form: &HashMap<String, String>, name: &str) -> String {
    form.get(name).cloned().unwrap_or_default()
}

fn optional_field(form: &HashMap<String, String>, name: &str) -> Option<String> {
    form.get(name).filter(|value| !value.is_empty()).cloned()
}

/// Inbound-call webhook
pub async fn incoming_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.signature_ok(&headers, "/webhooks/twilio/incoming-call", &form) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let incoming = IncomingCall {
        provider_call_id: field(&form, "CallSid"),
        from: field(&form, "From"),
        to: field(&form, "To"),
    };
    info!(
        call_sid = %incoming.provider_call_id,
        from = %incoming.from,
        to = %incoming.to,
        "Incoming call"
    );

    xml_response(state.inbound.handle(incoming).await)
}

/// Call-status callback
pub async fn call_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.signature_ok(&headers, "/webhooks/twilio/call-status", &form) {
        return StatusCode::FORBIDDEN.into_response();
    }

    state
        .status
        .apply_status(StatusCallback {
            provider_call_id: field(&form, "CallSid"),
            status: field(&form, "CallStatus"),
            duration: optional_field(&form, "CallDuration"),
            price: optional_field(&form, "CallPrice"),
        })
        .await;

    StatusCode::OK.into_response()
}

/// Recording-completion callback
pub async fn recording_complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.signature_ok(&headers, "/webhooks/twilio/recording-complete", &form) {
        return StatusCode::FORBIDDEN.into_response();
    }

    state
        .status
        .attach_recording(RecordingCallback {
            provider_call_id: field(&form, "CallSid"),
            recording_url: optional_field(&form, "RecordingUrl"),
            recording_sid: optional_field(&form, "RecordingSid"),
            duration: optional_field(&form, "RecordingDuration"),
        })
        .await;

    StatusCode::OK.into_response()
}

/// Recording-status callback, logged for observability only
pub async fn recording_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.signature_ok(&headers, "/webhooks/twilio/recording-status", &form) {
        return StatusCode::FORBIDDEN.into_response();
    }

    info!(
        recording_sid = %field(&form, "RecordingSid"),
        status = %field(&form, "RecordingStatus"),
        "Recording status update"
    );

    StatusCode::OK.into_response()
}

/// Human-to-AI handoff webhook
pub async fn ai_handoff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.signature_ok(&headers, "/webhooks/twilio/ai-handoff", &form) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let call_sid = field(&form, "CallSid");
    info!(call_sid = %call_sid, "AI handoff requested");

    match state.inbound.handle_handoff(&call_sid).await {
        Some(instruction) => xml_response(instruction),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "ok"
}
