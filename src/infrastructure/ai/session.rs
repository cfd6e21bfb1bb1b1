//! AI session configuration
//!
//! Builds the one-shot session payload sent right after the realtime
//! connection opens, before any audio is relayed. The technical parameters
//! are fixed for telephony; only the instruction text varies per business.

use super::realtime::{
    encode, ClientEvent, ResponseRequest, SessionConfig, TranscriptionConfig, TurnDetection,
};
use futures::{Sink, SinkExt};

// Both audio directions use the narrowband telephony codec; no transcoding
// happens anywhere in the bridge.
const AUDIO_FORMAT: &str = "g711_ulaw";
const VOICE: &str = "alloy";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const VAD_THRESHOLD: f64 = 0.5;
const VAD_PREFIX_PADDING_MS: u32 = 300;
const VAD_SILENCE_DURATION_MS: u32 = 500;
const TEMPERATURE: f64 = 0.7;
const MAX_RESPONSE_OUTPUT_TOKENS: u32 = 4096;

/// Business identity handed to the agent
#[derive(Debug, Clone)]
pub struct BusinessProfile {
    pub name: String,
    pub description: String,
    pub custom_instructions: String,
}

/// Compose the system instructions for a business
pub fn build_instructions(profile: &BusinessProfile) -> String {
    format!(
        "You are a helpful AI assistant for {name}.\n\n\
         Business Information:\n\
         - Name: {name}\n\
         - Description: {description}\n\n\
         Your role:\n\
         - You are answering customer calls when the business is busy\n\
         - Be professional, friendly, and helpful\n\
         - Provide information about the business services\n\
         - If you don't know something specific, offer to take a message or have someone call back\n\
         - Keep responses natural and conversational for phone conversation\n\
         - Always try to be helpful and positive\n\
         - You can help with general inquiries, take messages, provide business hours, and basic information\n\n\
         Additional Instructions:\n\
         {custom}\n\n\
         Guidelines for phone conversations:\n\
         - Speak naturally and conversationally\n\
         - Don't be overly verbose - keep responses concise but helpful\n\
         - Ask clarifying questions when needed\n\
         - If you can't help with something specific, offer alternatives like taking a message\n\
         - Be empathetic and understanding\n\
         - Thank the caller for their patience since the business is currently busy",
        name = profile.name,
        description = profile.description,
        custom = profile.custom_instructions,
    )
}

/// The `session.update` event for a business
pub fn session_update(profile: &BusinessProfile) -> ClientEvent {
    ClientEvent::SessionUpdate {
        session: SessionConfig {
            modalities: vec!["text", "audio"],
            instructions: build_instructions(profile),
            voice: VOICE,
            input_audio_format: AUDIO_FORMAT,
            output_audio_format: AUDIO_FORMAT,
            input_audio_transcription: TranscriptionConfig {
                model: TRANSCRIPTION_MODEL,
            },
            turn_detection: TurnDetection {
                kind: "server_vad",
                threshold: VAD_THRESHOLD,
                prefix_padding_ms: VAD_PREFIX_PADDING_MS,
                silence_duration_ms: VAD_SILENCE_DURATION_MS,
            },
            temperature: TEMPERATURE,
            max_response_output_tokens: MAX_RESPONSE_OUTPUT_TOKENS,
        },
    }
}

/// The greeting request sent after configuration, so the caller hears a
/// welcome without having to speak first
pub fn greeting_request(business_name: &str) -> ClientEvent {
    let greeting = format!(
        "Hello! Thank you for calling {}. I'm your AI assistant, and I'm here to \
         help you while our team is busy. What can I help you with today?",
        business_name
    );
    ClientEvent::ResponseCreate {
        response: ResponseRequest {
            instructions: format!("Say the following greeting: {}", greeting),
        },
    }
}

/// Prime a fresh AI connection for a business.
///
/// Sends the session configuration and the greeting request back to back
/// and returns without waiting for any reply, so the greeting starts as
/// soon as the far side processes it.
pub async fn configure<K>(dest: &mut K, profile: &BusinessProfile) -> Result<(), K::Error>
where
    K: Sink<String> + Unpin,
{
    dest.send(encode(&session_update(profile))).await?;
    dest.send(encode(&greeting_request(&profile.name))).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::StreamExt;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Rose Cafe".to_string(),
            description: "Neighborhood coffee shop".to_string(),
            custom_instructions: "We close at 5pm on Sundays.".to_string(),
        }
    }

    #[test]
    fn test_instructions_carry_business_context_verbatim() {
        let text = build_instructions(&profile());
        assert!(text.contains("Rose Cafe"));
        assert!(text.contains("Neighborhood coffee shop"));
        assert!(text.contains("We close at 5pm on Sundays."));
        assert!(text.contains("take a message"));
    }

    #[test]
    fn test_session_update_uses_fixed_telephony_parameters() {
        let event = session_update(&profile());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session.update");
        assert_eq!(json["session"]["input_audio_format"], "g711_ulaw");
        assert_eq!(json["session"]["output_audio_format"], "g711_ulaw");
        assert_eq!(json["session"]["turn_detection"]["type"], "server_vad");
        assert_eq!(json["session"]["turn_detection"]["silence_duration_ms"], 500);
        assert_eq!(json["session"]["max_response_output_tokens"], 4096);
    }

    #[test]
    fn test_greeting_names_the_business() {
        let json = serde_json::to_value(greeting_request("Rose Cafe")).unwrap();
        assert_eq!(json["type"], "response.create");
        assert!(json["response"]["instructions"]
            .as_str()
            .unwrap()
            .contains("Thank you for calling Rose Cafe"));
    }

    #[tokio::test]
    async fn test_configure_sends_update_before_greeting() {
        let (mut tx, mut rx) = mpsc::unbounded::<String>();
        configure(&mut tx, &profile()).await.unwrap();
        drop(tx);

        let first: serde_json::Value =
            serde_json::from_str(&rx.next().await.unwrap()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&rx.next().await.unwrap()).unwrap();
        assert_eq!(first["type"], "session.update");
        assert_eq!(second["type"], "response.create");
        assert!(rx.next().await.is_none());
    }
}
