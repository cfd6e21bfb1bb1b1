//! AI realtime speech-to-speech integration

pub mod realtime;
pub mod session;

pub use realtime::{connect, ClientEvent, ServerEvent};
pub use session::BusinessProfile;
