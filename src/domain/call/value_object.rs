//! Call value objects

use serde::{Deserialize, Serialize};

/// Which leg answered the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Routed to a human operator
    Human,
    /// Routed to the AI voice agent
    Ai,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Human => "human",
            CallType::Ai => "ai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "human" => Some(CallType::Human),
            "ai" => Some(CallType::Ai),
            _ => None,
        }
    }
}

/// Call lifecycle status
///
/// `Ringing` and `InProgress` are live states; the remaining three are
/// terminal. Terminal states are sticky: no later callback moves a call out
/// of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Ringing,
    InProgress,
    Completed,
    Failed,
    NoAnswer,
}

/// Status callback event reported by the telephony provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    InProgress,
    Completed,
    Busy,
    NoAnswer,
}

impl StatusEvent {
    /// Map a provider status string to an event. Unknown strings map to
    /// `None` and are ignored by the tracker.
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "in-progress" => Some(StatusEvent::InProgress),
            "completed" => Some(StatusEvent::Completed),
            "busy" => Some(StatusEvent::Busy),
            "no-answer" => Some(StatusEvent::NoAnswer),
            _ => None,
        }
    }
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Completed | CallStatus::Failed | CallStatus::NoAnswer
        )
    }

    /// Reduce a status callback into the next status.
    ///
    /// Callbacks arrive asynchronously, possibly out of order or duplicated,
    /// so this is a total function: a terminal status absorbs every event,
    /// and live statuses move wherever the event says.
    pub fn apply(self, event: StatusEvent) -> CallStatus {
        if self.is_terminal() {
            return self;
        }

        match event {
            StatusEvent::InProgress => CallStatus::InProgress,
            StatusEvent::Completed => CallStatus::Completed,
            StatusEvent::Busy => CallStatus::Failed,
            StatusEvent::NoAnswer => CallStatus::NoAnswer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
            CallStatus::NoAnswer => "no_answer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ringing" => Some(CallStatus::Ringing),
            "in_progress" => Some(CallStatus::InProgress),
            "completed" => Some(CallStatus::Completed),
            "failed" => Some(CallStatus::Failed),
            "no_answer" => Some(CallStatus::NoAnswer),
            _ => None,
        }
    }
}
