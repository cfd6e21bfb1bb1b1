//! Call aggregate root

use crate::domain::call::event::{
    CallCreated, CallEvent, CallEventBase, CallRecordingAttached, CallStatusChanged,
};
use crate::domain::call::value_object::{CallStatus, CallType, StatusEvent};
use crate::domain::shared::events::EventMetadata;
use crate::domain::shared::value_objects::{BusinessId, CallId, PhoneNumberId, ProviderCallId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call aggregate root
///
/// One record per telephony call attempt. The provider call id is assigned
/// at creation and never changes; status moves through the reducer in
/// [`CallStatus::apply`]; duration, cost and recording fields are
/// write-once (a later callback may fill a gap but never replaces a value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    /// Aggregate root ID
    id: CallId,
    /// Provider-assigned call id, immutable once set
    provider_call_id: ProviderCallId,
    /// Owning business
    business_id: BusinessId,
    /// Terminating phone number
    phone_number_id: PhoneNumberId,
    /// Caller number as reported by the provider
    caller_number: String,
    /// Which leg is/was live
    call_type: CallType,
    /// Current lifecycle status
    status: CallStatus,
    /// When the call record was created
    started_at: DateTime<Utc>,
    /// When the call reached a terminal status
    ended_at: Option<DateTime<Utc>>,
    /// Whole seconds, from the status callback or recording metadata
    duration_seconds: Option<i32>,
    /// Post-call analysis text, filled by a later pipeline
    summary: Option<String>,
    /// Recording location, once the provider reports one
    recording_url: Option<String>,
    /// Provider recording id
    recording_sid: Option<String>,
    /// Monetary cost from the provider billing callback
    cost: Option<f64>,
    /// Pending domain events
    #[serde(skip)]
    events: Vec<CallEvent>,
}

impl Call {
    /// Create a new call in `Ringing` state
    pub fn new(
        provider_call_id: ProviderCallId,
        business_id: BusinessId,
        phone_number_id: PhoneNumberId,
        caller_number: String,
        call_type: CallType,
    ) -> Self {
        let mut call = Self {
            id: CallId::new(),
            provider_call_id: provider_call_id.clone(),
            business_id,
            phone_number_id,
            caller_number: caller_number.clone(),
            call_type,
            status: CallStatus::Ringing,
            started_at: Utc::now(),
            ended_at: None,
            duration_seconds: None,
            summary: None,
            recording_url: None,
            recording_sid: None,
            cost: None,
            events: Vec::new(),
        };

        call.record_event(CallEvent::Created(CallCreated {
            base: CallEventBase {
                metadata: EventMetadata::new("call.created".to_string()),
                provider_call_id,
            },
            call_type,
            caller_number,
        }));

        call
    }

    /// Rehydrate a call from storage without recording events
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CallId,
        provider_call_id: ProviderCallId,
        business_id: BusinessId,
        phone_number_id: PhoneNumberId,
        caller_number: String,
        call_type: CallType,
        status: CallStatus,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        duration_seconds: Option<i32>,
        summary: Option<String>,
        recording_url: Option<String>,
        recording_sid: Option<String>,
        cost: Option<f64>,
    ) -> Self {
        Self {
            id,
            provider_call_id,
            business_id,
            phone_number_id,
            caller_number,
            call_type,
            status,
            started_at,
            ended_at,
            duration_seconds,
            summary,
            recording_url,
            recording_sid,
            cost,
            events: Vec::new(),
        }
    }

    /// Apply a provider status callback.
    ///
    /// Returns whether the status actually changed. Terminal statuses are
    /// sticky, so a stale or duplicated callback is a no-op.
    pub fn apply_status(&mut self, event: StatusEvent) -> bool {
        let next = self.status.apply(event);
        if next == self.status {
            return false;
        }

        let old_status = self.status;
        self.status = next;

        if next.is_terminal() && self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }

        self.record_event(CallEvent::StatusChanged(CallStatusChanged {
            base: CallEventBase {
                metadata: EventMetadata::new("call.status_changed".to_string()),
                provider_call_id: self.provider_call_id.clone(),
            },
            old_status,
            new_status: next,
        }));

        true
    }

    /// Set the duration if it has not been set yet
    pub fn set_duration(&mut self, seconds: i32) -> bool {
        if self.duration_seconds.is_some() {
            return false;
        }
        self.duration_seconds = Some(seconds);
        true
    }

    /// Set the cost if it has not been set yet
    pub fn set_cost(&mut self, cost: f64) -> bool {
        if self.cost.is_some() {
            return false;
        }
        self.cost = Some(cost);
        true
    }

    /// Attach recording metadata.
    ///
    /// Recording fields are write-once; attaching is allowed in any status
    /// because the recording callback is independent of the status stream.
    pub fn attach_recording(&mut self, url: Option<String>, sid: Option<String>) -> bool {
        let mut changed = false;

        if self.recording_url.is_none() {
            if let Some(url) = url {
                self.recording_url = Some(url);
                changed = true;
            }
        }
        if self.recording_sid.is_none() {
            if let Some(sid) = sid {
                self.recording_sid = Some(sid);
                changed = true;
            }
        }

        if changed {
            self.record_event(CallEvent::RecordingAttached(CallRecordingAttached {
                base: CallEventBase {
                    metadata: EventMetadata::new("call.recording_attached".to_string()),
                    provider_call_id: self.provider_call_id.clone(),
                },
                recording_sid: self.recording_sid.clone(),
            }));
        }

        changed
    }

    /// Reclassify the call as AI-handled (human-to-AI handoff)
    pub fn mark_ai(&mut self) {
        self.call_type = CallType::Ai;
    }

    /// Record a domain event
    fn record_event(&mut self, event: CallEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn take_events(&mut self) -> Vec<CallEvent> {
        std::mem::take(&mut self.events)
    }

    // Getters
    pub fn id(&self) -> &CallId {
        &self.id
    }

    pub fn provider_call_id(&self) -> &ProviderCallId {
        &self.provider_call_id
    }

    pub fn business_id(&self) -> &BusinessId {
        &self.business_id
    }

    pub fn phone_number_id(&self) -> &PhoneNumberId {
        &self.phone_number_id
    }

    pub fn caller_number(&self) -> &str {
        &self.caller_number
    }

    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at
    }

    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    pub fn duration_seconds(&self) -> Option<i32> {
        self.duration_seconds
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn recording_url(&self) -> Option<&str> {
        self.recording_url.as_deref()
    }

    pub fn recording_sid(&self) -> Option<&str> {
        self.recording_sid.as_deref()
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_call() -> Call {
        Call::new(
            ProviderCallId::new("CA1234567890"),
            BusinessId::new(),
            PhoneNumberId::new(),
            "+15551230001".to_string(),
            CallType::Ai,
        )
    }

    #[test]
    fn test_call_lifecycle() {
        let mut call = create_test_call();

        assert_eq!(call.status(), CallStatus::Ringing);
        assert_eq!(call.events.len(), 1); // Created event

        assert!(call.apply_status(StatusEvent::InProgress));
        assert_eq!(call.status(), CallStatus::InProgress);
        assert!(call.ended_at().is_none());

        assert!(call.apply_status(StatusEvent::Completed));
        assert_eq!(call.status(), CallStatus::Completed);
        assert!(call.ended_at().is_some());

        let events = call.take_events();
        assert_eq!(events.len(), 3); // Created, two StatusChanged
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let mut call = create_test_call();
        call.apply_status(StatusEvent::Completed);
        let ended_at = *call.ended_at().unwrap();

        assert!(!call.apply_status(StatusEvent::InProgress));
        assert!(!call.apply_status(StatusEvent::Busy));
        assert_eq!(call.status(), CallStatus::Completed);
        assert_eq!(call.ended_at(), Some(&ended_at));
    }

    #[test]
    fn test_duration_and_cost_are_write_once() {
        let mut call = create_test_call();

        assert!(call.set_duration(42));
        assert!(!call.set_duration(99));
        assert_eq!(call.duration_seconds(), Some(42));

        assert!(call.set_cost(0.0075));
        assert!(!call.set_cost(1.0));
        assert_eq!(call.cost(), Some(0.0075));
    }

    #[test]
    fn test_recording_attaches_in_any_status() {
        let mut call = create_test_call();
        call.apply_status(StatusEvent::Completed);

        assert!(call.attach_recording(
            Some("https://recordings.example/RE1".to_string()),
            Some("RE1".to_string()),
        ));
        assert_eq!(call.recording_sid(), Some("RE1"));

        // A second callback must not replace the stored values
        assert!(!call.attach_recording(
            Some("https://recordings.example/RE2".to_string()),
            Some("RE2".to_string()),
        ));
        assert_eq!(call.recording_sid(), Some("RE1"));
    }

    #[test]
    fn test_attach_recording_ignores_missing_fields() {
        let mut call = create_test_call();
        assert!(!call.attach_recording(None, None));
        assert!(call.recording_url().is_none());
    }

    #[test]
    fn test_mark_ai_reclassifies_call() {
        let mut call = Call::new(
            ProviderCallId::new("CA42"),
            BusinessId::new(),
            PhoneNumberId::new(),
            "+15550001111".to_string(),
            CallType::Human,
        );
        call.mark_ai();
        assert_eq!(call.call_type(), CallType::Ai);
    }
}
