//! Interface layer - External interfaces
//!
//! This layer handles:
//! - Provider webhook endpoints
//! - The media-stream WebSocket upgrade
//! - Health and metrics endpoints

pub mod api;
