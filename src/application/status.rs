//! Call status tracking
//!
//! Applies asynchronous provider callbacks to call records. Callbacks may
//! arrive out of order, duplicated, or for calls we never created; all of
//! those are absorbed here and acknowledged, never bounced back to the
//! provider.

use crate::domain::call::{CallRepository, StatusEvent};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::ProviderCallId;
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Call-status callback payload
#[derive(Debug, Clone)]
pub struct StatusCallback {
    pub provider_call_id: String,
    pub status: String,
    pub duration: Option<String>,
    pub price: Option<String>,
}

/// Recording-completion callback payload
#[derive(Debug, Clone)]
pub struct RecordingCallback {
    pub provider_call_id: String,
    pub recording_url: Option<String>,
    pub recording_sid: Option<String>,
    pub duration: Option<String>,
}

/// Consumes provider callbacks and advances call records
pub struct CallStatusService {
    calls: Arc<dyn CallRepository>,
}

impl CallStatusService {
    pub fn new(calls: Arc<dyn CallRepository>) -> Self {
        Self { calls }
    }

    /// Apply a call-status callback. Always acknowledges; failures are
    /// logged and swallowed so the provider does not retry forever.
    pub async fn apply_status(&self, callback: StatusCallback) {
        if let Err(e) = self.try_apply_status(&callback).await {
            error!(
                call_sid = %callback.provider_call_id,
                error = %e,
                "Failed to apply status callback"
            );
        }
    }

    async fn try_apply_status(&self, callback: &StatusCallback) -> Result<()> {
        let id = ProviderCallId::new(callback.provider_call_id.clone());
        let Some(mut call) = self.calls.find_by_provider_id(&id).await? else {
            warn!(call_sid = %callback.provider_call_id, "Status callback for unknown call");
            return Ok(());
        };

        let Some(event) = StatusEvent::from_provider(&callback.status) else {
            info!(
                call_sid = %callback.provider_call_id,
                status = %callback.status,
                "Ignoring unmapped provider status"
            );
            return Ok(());
        };

        let changed = call.apply_status(event);

        let mut filled = false;
        if event == StatusEvent::Completed {
            if let Some(duration) = parse_field::<i32>(&callback.duration, "CallDuration") {
                filled |= call.set_duration(duration);
            }
            if let Some(price) = parse_field::<f64>(&callback.price, "CallPrice") {
                filled |= call.set_cost(price);
            }
        }

        if changed || filled {
            self.calls.update(&call).await?;
        }

        counter!("status_callbacks_total", "status" => callback.status.clone()).increment(1);
        info!(
            call_sid = %callback.provider_call_id,
            status = call.status().as_str(),
            "Status callback applied"
        );
        Ok(())
    }

    /// Attach recording metadata from a recording-completion callback.
    pub async fn attach_recording(&self, callback: RecordingCallback) {
        if let Err(e) = self.try_attach_recording(&callback).await {
            error!(
                call_sid = %callback.provider_call_id,
                error = %e,
                "Failed to attach recording"
            );
        }
    }

    async fn try_attach_recording(&self, callback: &RecordingCallback) -> Result<()> {
        let id = ProviderCallId::new(callback.provider_call_id.clone());
        let Some(mut call) = self.calls.find_by_provider_id(&id).await? else {
            warn!(call_sid = %callback.provider_call_id, "Recording callback for unknown call");
            return Ok(());
        };

        let mut changed = call.attach_recording(
            callback.recording_url.clone(),
            callback.recording_sid.clone(),
        );

        // The recording length backfills a duration the status stream never
        // delivered; it never overrides one that did arrive
        if call.duration_seconds().is_none() {
            if let Some(duration) = parse_field::<i32>(&callback.duration, "RecordingDuration") {
                changed |= call.set_duration(duration);
            }
        }

        if changed {
            self.calls.update(&call).await?;
        }

        info!(
            call_sid = %callback.provider_call_id,
            recording_sid = callback.recording_sid.as_deref().unwrap_or(""),
            "Recording callback applied"
        );
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(value: &Option<String>, name: &str) -> Option<T> {
    let raw = value.as_deref()?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(field = name, value = raw, "Unparseable callback field");
            None
        }
    }
}
