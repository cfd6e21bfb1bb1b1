//! Realtime API wire protocol and connection
//!
//! The AI side is a WebSocket speaking JSON events tagged by `type`. We
//! send session configuration, response requests and audio appends; we
//! receive audio deltas plus a handful of informational events.

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::http::header::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type AiSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event sent to the AI side
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseRequest },
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioAppend { audio: String },
}

/// Session configuration payload
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub modalities: Vec<&'static str>,
    pub instructions: String,
    pub voice: &'static str,
    pub input_audio_format: &'static str,
    pub output_audio_format: &'static str,
    pub input_audio_transcription: TranscriptionConfig,
    pub turn_detection: TurnDetection,
    pub temperature: f64,
    pub max_response_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionConfig {
    pub model: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub threshold: f64,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
}

/// Out-of-band instruction for the next response
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRequest {
    pub instructions: String,
}

/// Event received from the AI side
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated,
    #[serde(rename = "response.audio.delta")]
    AudioDelta {
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptionCompleted {
        #[serde(default)]
        transcript: String,
    },
    #[serde(rename = "response.done")]
    ResponseDone,
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Serialize a client event to a wire frame
pub fn encode(event: &ClientEvent) -> String {
    serde_json::to_string(event).expect("client events serialize to JSON")
}

/// Open the realtime connection with the business credential.
///
/// The credential authenticates exactly one bridge; it is attached as a
/// bearer header and dropped with the request.
pub async fn connect(url: &str, credential: &str) -> Result<AiSocket, WsError> {
    let mut request = url.into_client_request()?;
    let bearer =
        HeaderValue::from_str(&format!("Bearer {}", credential)).map_err(http::Error::from)?;
    let headers = request.headers_mut();
    headers.insert("Authorization", bearer);
    headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

    let (socket, _response) = connect_async(request).await?;
    Ok(socket)
}

/// Split an AI socket into text-frame stream/sink halves
pub fn into_text_halves(
    socket: AiSocket,
) -> (
    impl futures::Sink<String, Error = WsError> + Unpin,
    impl futures::Stream<Item = String> + Unpin + Send,
) {
    let (sink, stream) = socket.split();
    let sink = sink.with(|text: String| futures::future::ready(Ok::<_, WsError>(Message::Text(text))));
    let stream = stream
        .filter_map(|frame| {
            futures::future::ready(match frame {
                Ok(Message::Text(text)) => Some(text),
                _ => None,
            })
        })
        .boxed();
    (sink, stream)
}
