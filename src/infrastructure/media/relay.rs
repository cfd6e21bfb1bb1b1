//! Relay pumps between the telephony stream and the AI connection
//!
//! Each direction is its own pump over text frames. The pumps are generic
//! over `futures` stream/sink halves so the bridge can hand them real
//! socket halves and the tests can hand them channels. Frames within a
//! pump are forwarded in arrival order; the two pumps never share state.

use crate::infrastructure::ai::realtime::{encode, ClientEvent, ServerEvent};
use crate::infrastructure::telephony::stream::{OutboundMedia, TelephonyEvent};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Forward caller audio to the AI side.
///
/// `media` frames become `input_audio_buffer.append` events, payloads
/// untouched. A `stop` frame or the end of the stream ends the pump;
/// malformed frames are logged and skipped. Returns the number of frames
/// forwarded.
pub async fn pump_caller_audio<S, K>(mut source: S, mut dest: K) -> u64
where
    S: Stream<Item = String> + Unpin,
    K: Sink<String> + Unpin,
    K::Error: std::fmt::Display,
{
    let mut forwarded: u64 = 0;

    while let Some(text) = source.next().await {
        match serde_json::from_str::<TelephonyEvent>(&text) {
            Ok(TelephonyEvent::Media { media }) => {
                let frame = encode(&ClientEvent::InputAudioAppend {
                    audio: media.payload,
                });
                if let Err(e) = dest.send(frame).await {
                    warn!(error = %e, "AI side rejected audio, stopping relay");
                    break;
                }
                forwarded += 1;
            }
            Ok(TelephonyEvent::Stop) => {
                info!(frames = forwarded, "Telephony stream stopped");
                break;
            }
            Ok(TelephonyEvent::Start { .. }) => {
                warn!("Duplicate start frame mid-stream, ignoring");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Skipping unparseable telephony frame");
            }
        }
    }

    forwarded
}

/// Forward agent audio back to the caller.
///
/// `response.audio.delta` events become outbound `media` frames carrying
/// the handshake stream id. Non-audio events are logged for observability
/// and produce no telephony output; an `error` event does not end the
/// conversation by itself. Returns the number of frames forwarded.
pub async fn pump_agent_audio<S, K>(mut source: S, mut dest: K, stream_sid: &str) -> u64
where
    S: Stream<Item = String> + Unpin,
    K: Sink<String> + Unpin,
    K::Error: std::fmt::Display,
{
    let mut forwarded: u64 = 0;

    while let Some(text) = source.next().await {
        match serde_json::from_str::<ServerEvent>(&text) {
            Ok(ServerEvent::AudioDelta { delta: Some(delta) }) => {
                let frame = OutboundMedia::new(stream_sid, delta);
                let json = serde_json::to_string(&frame)
                    .expect("outbound media frames serialize to JSON");
                if let Err(e) = dest.send(json).await {
                    warn!(error = %e, "Telephony side rejected audio, stopping relay");
                    break;
                }
                forwarded += 1;
            }
            Ok(ServerEvent::AudioDelta { delta: None }) => {}
            Ok(ServerEvent::SessionCreated) => {
                info!("AI session created");
            }
            Ok(ServerEvent::TranscriptionCompleted { transcript }) => {
                info!(transcript = %transcript, "Caller said");
            }
            Ok(ServerEvent::ResponseDone) => {
                debug!("AI response completed");
            }
            Ok(ServerEvent::Error { error }) => {
                error!(detail = %error, "AI error event");
            }
            Ok(ServerEvent::Other) => {}
            Err(e) => {
                warn!(error = %e, "Skipping unparseable AI frame");
            }
        }
    }

    forwarded
}
