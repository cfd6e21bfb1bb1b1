//! Bridge lifecycle: handshake, AI connection, relay, teardown
//!
//! One bridge per AI-routed call. The provider opens the telephony-side
//! WebSocket and must send a `start` frame within the handshake window;
//! only then is the AI connection opened with the credential carried in
//! the handshake parameters. Both relay directions run under one
//! `select!`, so when either ends the other is cancelled with it, and
//! dropping the halves closes both sockets.

use crate::infrastructure::ai::realtime;
use crate::infrastructure::ai::session::{self, BusinessProfile};
use crate::infrastructure::media::relay;
use crate::infrastructure::telephony::recorder::CallRecorder;
use crate::infrastructure::telephony::stream::{StartFrame, TelephonyEvent};
use axum::extract::ws::{Message, WebSocket};
use futures::{future, SinkExt, Stream, StreamExt};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("timed out waiting for the start frame")]
    HandshakeTimeout,

    #[error("telephony stream disconnected before start")]
    Disconnected,

    #[error("start frame carried no AI credential")]
    MissingCredential,

    #[error("failed to open the AI connection: {0}")]
    AiConnect(#[from] WsError),

    #[error("failed to prime the AI session")]
    SessionSetup,
}

/// Transient state for one AI-routed call.
///
/// Built from the `start` handshake frame and owned exclusively by the
/// bridge run that created it; dropped at teardown. Deliberately not
/// `Debug`: the credential must never reach a log line.
pub struct BridgeSession {
    pub stream_sid: String,
    pub call_sid: String,
    pub caller_number: String,
    credential: String,
    pub profile: BusinessProfile,
}

impl BridgeSession {
    /// Extract the session from a start frame.
    ///
    /// A start frame without a credential is fatal: the bridge must not
    /// open an AI connection it cannot authenticate.
    pub fn from_start(start: StartFrame) -> Result<Self, BridgeError> {
        let params = start.custom_parameters;
        let credential = params
            .get("openai_api_key")
            .filter(|key| !key.is_empty())
            .cloned()
            .ok_or(BridgeError::MissingCredential)?;

        let get = |name: &str| params.get(name).cloned().unwrap_or_default();

        Ok(Self {
            stream_sid: start.stream_sid,
            call_sid: get("call_sid"),
            caller_number: get("caller_number"),
            credential,
            profile: BusinessProfile {
                name: get("business_name"),
                description: get("business_description"),
                custom_instructions: get("custom_instructions"),
            },
        })
    }

    fn credential(&self) -> &str {
        &self.credential
    }
}

/// Settings shared by every bridge run
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub realtime_url: String,
    pub handshake_timeout: Duration,
    pub public_host: String,
    pub record_calls: bool,
}

/// The per-call media bridge
#[derive(Clone)]
pub struct MediaBridge {
    settings: BridgeSettings,
    recorder: Arc<dyn CallRecorder>,
}

impl MediaBridge {
    pub fn new(settings: BridgeSettings, recorder: Arc<dyn CallRecorder>) -> Self {
        Self { settings, recorder }
    }

    /// Run the bridge for one telephony socket until either side ends.
    ///
    /// Never panics or propagates: a failed bridge is logged and the call
    /// simply ends; the recovery path is a fresh inbound call.
    pub async fn run(&self, socket: WebSocket) {
        match self.bridge(socket).await {
            Ok(()) => {
                counter!("bridge_sessions_total", "outcome" => "completed").increment(1);
            }
            Err(e) => {
                warn!(error = %e, "Media bridge ended with error");
                counter!("bridge_sessions_total", "outcome" => "error").increment(1);
            }
        }
    }

    async fn bridge(&self, socket: WebSocket) -> Result<(), BridgeError> {
        let (tel_sink, tel_stream) = socket.split();
        let mut tel_rx = tel_stream
            .filter_map(|frame| {
                future::ready(match frame {
                    Ok(Message::Text(text)) => Some(text),
                    _ => None,
                })
            })
            .boxed();
        let tel_tx =
            tel_sink.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text))));

        let start = await_start(&mut tel_rx, self.settings.handshake_timeout).await?;
        let session = BridgeSession::from_start(start)?;
        info!(
            call_sid = %session.call_sid,
            stream_sid = %session.stream_sid,
            business = %session.profile.name,
            "Media stream started"
        );

        // Fresh AI connection per bridge; an open failure has no retry, the
        // caller's next attempt gets a new bridge
        let ai_socket =
            realtime::connect(&self.settings.realtime_url, session.credential()).await?;
        let (mut ai_tx, ai_rx) = realtime::into_text_halves(ai_socket);

        session::configure(&mut ai_tx, &session.profile)
            .await
            .map_err(|_| BridgeError::SessionSetup)?;

        if self.settings.record_calls && !session.call_sid.is_empty() {
            let recorder = self.recorder.clone();
            let call_sid = session.call_sid.clone();
            let callback_url = format!(
                "https://{}/webhooks/twilio/recording-status",
                self.settings.public_host
            );
            tokio::spawn(async move {
                if let Err(e) = recorder.start(&call_sid, &callback_url).await {
                    warn!(call_sid = %call_sid, error = %e, "Failed to start recording");
                }
            });
        }

        // Both directions relay until one ends; select! drops the other,
        // which cancels it and closes the remaining socket halves
        let stream_sid = session.stream_sid.clone();
        tokio::select! {
            inbound = relay::pump_caller_audio(tel_rx, ai_tx) => {
                counter!("media_frames_total", "direction" => "inbound").increment(inbound);
                info!(call_sid = %session.call_sid, frames = inbound, "Telephony leg ended");
            }
            outbound = relay::pump_agent_audio(ai_rx, tel_tx, &stream_sid) => {
                counter!("media_frames_total", "direction" => "outbound").increment(outbound);
                info!(call_sid = %session.call_sid, frames = outbound, "AI leg ended");
            }
        }

        Ok(())
    }
}

/// Wait for the `start` handshake frame.
///
/// Frames arriving before `start` are logged and discarded. The wait is
/// bounded: a provider that never sends `start` gets both sides closed.
pub async fn await_start<S>(source: &mut S, wait: Duration) -> Result<StartFrame, BridgeError>
where
    S: Stream<Item = String> + Unpin,
{
    let deadline = tokio::time::Instant::now() + wait;

    loop {
        let frame = tokio::time::timeout_at(deadline, source.next())
            .await
            .map_err(|_| BridgeError::HandshakeTimeout)?;

        match frame {
            None => return Err(BridgeError::Disconnected),
            Some(text) => match serde_json::from_str::<TelephonyEvent>(&text) {
                Ok(TelephonyEvent::Start { start }) => return Ok(start),
                Ok(event) => {
                    debug!(?event, "Discarding pre-start telephony event");
                }
                Err(e) => {
                    warn!(error = %e, "Discarding unparseable pre-start frame");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use std::collections::HashMap;

    fn start_frame_json(with_key: bool) -> String {
        let key = if with_key {
            r#""openai_api_key": "sk-live","#
        } else {
            ""
        };
        format!(
            r#"{{
                "event": "start",
                "start": {{
                    "streamSid": "MZ1",
                    "customParameters": {{
                        {key}
                        "business_name": "Rose Cafe",
                        "business_description": "Coffee shop",
                        "call_sid": "CA1",
                        "caller_number": "+15550001111",
                        "custom_instructions": "Be brief."
                    }}
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn test_await_start_discards_earlier_events() {
        let (tx, mut rx) = mpsc::unbounded::<String>();
        tx.unbounded_send(r#"{"event": "connected", "protocol": "Call"}"#.to_string())
            .unwrap();
        tx.unbounded_send("garbage".to_string()).unwrap();
        tx.unbounded_send(start_frame_json(true)).unwrap();

        let start = await_start(&mut rx, Duration::from_secs(1)).await.unwrap();
        assert_eq!(start.stream_sid, "MZ1");
    }

    #[tokio::test]
    async fn test_await_start_times_out() {
        let (_tx, mut rx) = mpsc::unbounded::<String>();
        let result = await_start(&mut rx, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(BridgeError::HandshakeTimeout)));
    }

    #[tokio::test]
    async fn test_await_start_detects_disconnect() {
        let (tx, mut rx) = mpsc::unbounded::<String>();
        drop(tx);
        let result = await_start(&mut rx, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(BridgeError::Disconnected)));
    }

    #[tokio::test]
    async fn test_session_requires_credential() {
        let (tx, mut rx) = mpsc::unbounded::<String>();
        tx.unbounded_send(start_frame_json(false)).unwrap();
        let start = await_start(&mut rx, Duration::from_secs(1)).await.unwrap();
        assert!(matches!(
            BridgeSession::from_start(start),
            Err(BridgeError::MissingCredential)
        ));
    }

    #[test]
    fn test_session_extracts_handshake_parameters() {
        let mut params = HashMap::new();
        for (k, v) in [
            ("openai_api_key", "sk-live"),
            ("business_name", "Rose Cafe"),
            ("business_description", "Coffee shop"),
            ("call_sid", "CA1"),
            ("caller_number", "+15550001111"),
            ("custom_instructions", "Be brief."),
        ] {
            params.insert(k.to_string(), v.to_string());
        }
        let session = BridgeSession::from_start(StartFrame {
            stream_sid: "MZ1".to_string(),
            custom_parameters: params,
        })
        .unwrap();

        assert_eq!(session.stream_sid, "MZ1");
        assert_eq!(session.call_sid, "CA1");
        assert_eq!(session.profile.name, "Rose Cafe");
        assert_eq!(session.credential(), "sk-live");
    }

    #[test]
    fn test_empty_credential_is_rejected() {
        let mut params = HashMap::new();
        params.insert("openai_api_key".to_string(), String::new());
        let result = BridgeSession::from_start(StartFrame {
            stream_sid: "MZ1".to_string(),
            custom_parameters: params,
        });
        assert!(matches!(result, Err(BridgeError::MissingCredential)));
    }
}
