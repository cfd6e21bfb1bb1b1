//! Infrastructure layer - Adapters for external systems
//!
//! Telephony provider integration, the AI realtime connection, the media
//! bridge between them, and persistence.

pub mod ai;
pub mod media;
pub mod persistence;
pub mod telephony;
