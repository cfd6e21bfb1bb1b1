//! Telephony provider integration (Twilio-shaped)
//!
//! Covers the three surfaces the provider exposes to us: TwiML control
//! documents returned from webhooks, the media-stream WebSocket wire
//! protocol, and the REST API used to start call recordings.

pub mod recorder;
pub mod signature;
pub mod stream;
pub mod twiml;

pub use recorder::{CallRecorder, HttpCallRecorder, NoopCallRecorder};
pub use stream::{MediaFrame, OutboundMedia, StartFrame, TelephonyEvent};
pub use twiml::VoiceInstruction;
