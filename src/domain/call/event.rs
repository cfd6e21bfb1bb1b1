//! Call domain events

use crate::domain::call::value_object::{CallStatus, CallType};
use crate::domain::shared::events::EventMetadata;
use crate::domain::shared::value_objects::ProviderCallId;
use serde::{Deserialize, Serialize};

/// Common fields for all call events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEventBase {
    pub metadata: EventMetadata,
    pub provider_call_id: ProviderCallId,
}

/// Call was created from an inbound-call signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallCreated {
    pub base: CallEventBase,
    pub call_type: CallType,
    pub caller_number: String,
}

/// Call status changed from a provider callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallStatusChanged {
    pub base: CallEventBase,
    pub old_status: CallStatus,
    pub new_status: CallStatus,
}

/// Recording metadata was attached to the call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecordingAttached {
    pub base: CallEventBase,
    pub recording_sid: Option<String>,
}

/// Call domain event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CallEvent {
    Created(CallCreated),
    StatusChanged(CallStatusChanged),
    RecordingAttached(CallRecordingAttached),
}
