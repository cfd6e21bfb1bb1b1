//! Frontdesk - AI receptionist for business phone lines
//!
//! Routes inbound calls to an AI voice agent and bridges the provider's
//! media stream to a realtime speech-to-speech API, tracking each call's
//! lifecycle from asynchronous provider callbacks.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
