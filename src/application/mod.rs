//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases:
//! routing an inbound call and tracking call status from provider
//! callbacks.

pub mod inbound;
pub mod status;

pub use inbound::{IncomingCall, InboundCallService};
pub use status::{CallStatusService, RecordingCallback, StatusCallback};
