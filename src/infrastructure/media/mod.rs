//! Media Stream Bridge
//!
//! Per-call duplex relay that owns the telephony-side media stream and the
//! AI-side realtime connection, translating frames between them until
//! either side terminates.

pub mod bridge;
pub mod relay;

pub use bridge::{BridgeError, BridgeSession, BridgeSettings, MediaBridge};
