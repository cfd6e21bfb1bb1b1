//! Business bounded context - read-only lookup of who owns a called number
//!
//! Businesses, their phone numbers and their AI configuration are managed
//! elsewhere; this service only resolves them when routing a call.

pub mod provider;

pub use provider::{BusinessContext, BusinessContextProvider};

use crate::domain::shared::value_objects::{BusinessId, PhoneNumberId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A business that owns one or more inbound numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// An inbound phone number owned by a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: PhoneNumberId,
    pub number: String,
    pub business_id: BusinessId,
}

/// AI voice-agent configuration for a business
///
/// The API key is a capability token scoped to one bridge lifetime. It is
/// passed through the stream handshake parameters and must never be logged
/// or persisted alongside conversation content.
#[derive(Clone)]
pub struct AiConfiguration {
    pub api_key: String,
    pub custom_instructions: Option<String>,
    pub is_active: bool,
}

impl fmt::Debug for AiConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfiguration")
            .field("api_key", &"<redacted>")
            .field("custom_instructions", &self.custom_instructions)
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl AiConfiguration {
    /// AI routing needs an active configuration with a non-empty credential
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.api_key.is_empty()
    }
}
