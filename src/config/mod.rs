//! Configuration management
//!
//! Settings come from an optional `frontdesk.toml` next to the binary with
//! `FRONTDESK__SECTION__KEY` environment overrides. Every section has a
//! default so the server starts with no file present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telephony: TelephonyConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable host name, used to build webhook callback and
    /// media-stream URLs handed to the telephony provider
    pub public_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    /// Provider account sid for REST calls (recording control)
    pub account_sid: String,
    /// Provider auth token; also the webhook signature key
    pub auth_token: String,
    /// Verify `X-Twilio-Signature` on webhook requests
    pub validate_signatures: bool,
    /// Ask the provider to record AI-handled calls
    pub record_calls: bool,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Realtime speech-to-speech endpoint, model included in the query
    pub realtime_url: String,
    /// How long the media stream may stay silent before the start frame
    pub handshake_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_host: "localhost:8080".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost/frontdesk".to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            validate_signatures: false,
            record_calls: true,
            api_base: "https://api.twilio.com".to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            realtime_url:
                "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview-2025-06-03"
                    .to_string(),
            handshake_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            telephony: TelephonyConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `frontdesk.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("frontdesk").required(false))
            .add_source(config::Environment::with_prefix("FRONTDESK").separator("__"))
            .build()?
            .try_deserialize()
    }
}
