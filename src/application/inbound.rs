//! Inbound call handling
//!
//! Resolves the called number to a business, creates the call record and
//! answers the provider webhook with a control document: reject for
//! unknown/inactive numbers, an apology-and-record fallback when no AI
//! configuration is usable, and a media-stream connect otherwise.

use crate::domain::business::{BusinessContext, BusinessContextProvider};
use crate::domain::call::{Call, CallRepository, CallType};
use crate::domain::routing::{RouteDecision, RoutingStrategy};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::ProviderCallId;
use crate::infrastructure::telephony::twiml::VoiceInstruction;
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, warn};

const STREAM_PATH: &str = "/webhooks/twilio/ai-media-stream";
const RECORDING_COMPLETE_PATH: &str = "/webhooks/twilio/recording-complete";
const RECORDING_STATUS_PATH: &str = "/webhooks/twilio/recording-status";

/// Inbound-call webhook payload
#[derive(Debug, Clone)]
pub struct IncomingCall {
    pub provider_call_id: String,
    pub from: String,
    pub to: String,
}

/// Routes inbound calls and produces the control document for the leg
pub struct InboundCallService {
    directory: Arc<dyn BusinessContextProvider>,
    calls: Arc<dyn CallRepository>,
    routing: RoutingStrategy,
    public_host: String,
}

impl InboundCallService {
    pub fn new(
        directory: Arc<dyn BusinessContextProvider>,
        calls: Arc<dyn CallRepository>,
        routing: RoutingStrategy,
        public_host: String,
    ) -> Self {
        Self {
            directory,
            calls,
            routing,
            public_host,
        }
    }

    /// Handle an inbound-call signal.
    ///
    /// Never fails: any unexpected error degrades to a generic apology so
    /// nothing internal crosses the webhook boundary.
    pub async fn handle(&self, incoming: IncomingCall) -> VoiceInstruction {
        match self.route(&incoming).await {
            Ok(instruction) => instruction,
            Err(e) => {
                error!(
                    call_sid = %incoming.provider_call_id,
                    error = %e,
                    "Inbound call handling failed"
                );
                technical_difficulties()
            }
        }
    }

    async fn route(&self, incoming: &IncomingCall) -> Result<VoiceInstruction> {
        let Some((number, context)) = self.directory.resolve_number(&incoming.to).await? else {
            warn!(to = %incoming.to, "Called number is not provisioned");
            counter!("calls_routed_total", "outcome" => "rejected").increment(1);
            return Ok(VoiceInstruction::Reject);
        };

        if !context.business.is_active {
            warn!(
                to = %incoming.to,
                business = %context.business.name,
                "Business is inactive"
            );
            counter!("calls_routed_total", "outcome" => "rejected").increment(1);
            return Ok(VoiceInstruction::Reject);
        }

        if self.routing.decide(&context) == RouteDecision::Human {
            // No dial-out path yet; the AI leg answers regardless
            warn!("Human routing requested but not available, using AI agent");
        }

        let call = Call::new(
            ProviderCallId::new(incoming.provider_call_id.clone()),
            context.business.id,
            number.id,
            incoming.from.clone(),
            CallType::Ai,
        );
        self.calls.create(&call).await?;

        info!(
            call_sid = %incoming.provider_call_id,
            business = %context.business.name,
            "Routing call to AI agent"
        );

        let usable_config = context
            .ai_config
            .as_ref()
            .filter(|config| config.is_usable());

        let Some(config) = usable_config else {
            warn!(
                business = %context.business.name,
                "No usable AI configuration, falling back to voicemail"
            );
            counter!("calls_routed_total", "outcome" => "fallback").increment(1);
            return Ok(self.apology(&context.business.name));
        };

        counter!("calls_routed_total", "outcome" => "ai").increment(1);
        Ok(self.connect_stream(incoming, &context, &config.api_key, &config.custom_instructions))
    }

    /// Mid-call handoff from a human operator to the AI agent.
    ///
    /// Returns `None` when the call is unknown, so the webhook can answer
    /// 404 and the provider keeps the current leg.
    pub async fn handle_handoff(&self, provider_call_id: &str) -> Option<VoiceInstruction> {
        let result = self.handoff(provider_call_id).await;
        match result {
            Ok(instruction) => instruction,
            Err(e) => {
                error!(call_sid = %provider_call_id, error = %e, "AI handoff failed");
                Some(technical_difficulties())
            }
        }
    }

    async fn handoff(&self, provider_call_id: &str) -> Result<Option<VoiceInstruction>> {
        let id = ProviderCallId::new(provider_call_id);
        let Some(mut call) = self.calls.find_by_provider_id(&id).await? else {
            warn!(call_sid = %provider_call_id, "Handoff requested for unknown call");
            return Ok(None);
        };

        call.mark_ai();
        self.calls.update(&call).await?;

        let context = self.directory.resolve_business(call.business_id()).await?;
        let usable = context
            .as_ref()
            .and_then(|ctx| ctx.ai_config.as_ref().filter(|config| config.is_usable()))
            .cloned();

        let (Some(context), Some(config)) = (context, usable) else {
            return Ok(Some(VoiceInstruction::SayHangup {
                message: "I'm sorry, but I cannot transfer you to our AI assistant right now."
                    .to_string(),
            }));
        };

        let incoming = IncomingCall {
            provider_call_id: provider_call_id.to_string(),
            from: call.caller_number().to_string(),
            to: String::new(),
        };
        Ok(Some(self.connect_stream(
            &incoming,
            &context,
            &config.api_key,
            &config.custom_instructions,
        )))
    }

    fn apology(&self, business_name: &str) -> VoiceInstruction {
        VoiceInstruction::SayRecordHangup {
            message: format!(
                "Thank you for calling {}. Unfortunately, no one is available to take \
                 your call right now. Please try calling back later or leave a message \
                 after the tone.",
                business_name
            ),
            action: RECORDING_COMPLETE_PATH.to_string(),
            status_callback: RECORDING_STATUS_PATH.to_string(),
        }
    }

    fn connect_stream(
        &self,
        incoming: &IncomingCall,
        context: &BusinessContext,
        api_key: &str,
        custom_instructions: &Option<String>,
    ) -> VoiceInstruction {
        VoiceInstruction::ConnectStream {
            url: format!("wss://{}{}", self.public_host, STREAM_PATH),
            parameters: vec![
                (
                    "business_id".to_string(),
                    context.business.id.to_string(),
                ),
                (
                    "business_name".to_string(),
                    context.business.name.clone(),
                ),
                (
                    "business_description".to_string(),
                    context.business.description.clone().unwrap_or_default(),
                ),
                (
                    "call_sid".to_string(),
                    incoming.provider_call_id.clone(),
                ),
                ("caller_number".to_string(), incoming.from.clone()),
                ("openai_api_key".to_string(), api_key.to_string()),
                (
                    "custom_instructions".to_string(),
                    custom_instructions.clone().unwrap_or_default(),
                ),
            ],
        }
    }
}

/// Generic last-resort response when routing itself failed
fn technical_difficulties() -> VoiceInstruction {
    VoiceInstruction::SayHangup {
        message: "Sorry, we're experiencing technical difficulties.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::business::{AiConfiguration, Business, PhoneNumber};
    use crate::domain::call::CallStatus;
    use crate::domain::shared::value_objects::{BusinessId, PhoneNumberId};
    use crate::infrastructure::persistence::memory::{
        InMemoryBusinessDirectory, InMemoryCallRepository,
    };

    const NUMBER: &str = "+15552223333";

    fn service(
        active: bool,
        ai_config: Option<AiConfiguration>,
    ) -> (InboundCallService, Arc<InMemoryCallRepository>) {
        let business = Business {
            id: BusinessId::new(),
            name: "Rose Cafe".to_string(),
            description: Some("Neighborhood coffee shop".to_string()),
            is_active: active,
        };
        let number = PhoneNumber {
            id: PhoneNumberId::new(),
            number: NUMBER.to_string(),
            business_id: business.id,
        };
        let mut directory = InMemoryBusinessDirectory::new();
        directory.register(business, number, ai_config);

        let calls = Arc::new(InMemoryCallRepository::new());
        let service = InboundCallService::new(
            Arc::new(directory),
            calls.clone(),
            RoutingStrategy::AlwaysAi,
            "pbx.example.com".to_string(),
        );
        (service, calls)
    }

    fn ai_config() -> AiConfiguration {
        AiConfiguration {
            api_key: "sk-live".to_string(),
            custom_instructions: Some("We close at 5pm.".to_string()),
            is_active: true,
        }
    }

    fn incoming(to: &str) -> IncomingCall {
        IncomingCall {
            provider_call_id: "CA1".to_string(),
            from: "+15550001111".to_string(),
            to: to.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_number_is_rejected_without_a_call_record() {
        let (service, calls) = service(true, Some(ai_config()));
        let instruction = service.handle(incoming("+15559990000")).await;
        assert_eq!(instruction, VoiceInstruction::Reject);
        assert!(calls.is_empty().await);
    }

    #[tokio::test]
    async fn test_inactive_business_is_rejected_without_a_call_record() {
        let (service, calls) = service(false, Some(ai_config()));
        let instruction = service.handle(incoming(NUMBER)).await;
        assert_eq!(instruction, VoiceInstruction::Reject);
        assert!(calls.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_ai_config_falls_back_to_voicemail() {
        let (service, calls) = service(true, None);
        let instruction = service.handle(incoming(NUMBER)).await;

        match instruction {
            VoiceInstruction::SayRecordHangup { message, .. } => {
                assert!(message.contains("Rose Cafe"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }

        // The call exists and stays ringing until a status callback
        let call = calls
            .find_by_provider_id(&ProviderCallId::new("CA1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(call.status(), CallStatus::Ringing);
    }

    #[tokio::test]
    async fn test_empty_credential_falls_back_to_voicemail() {
        let config = AiConfiguration {
            api_key: String::new(),
            ..ai_config()
        };
        let (service, _) = service(true, Some(config));
        let instruction = service.handle(incoming(NUMBER)).await;
        assert!(matches!(instruction, VoiceInstruction::SayRecordHangup { .. }));
    }

    #[tokio::test]
    async fn test_valid_config_connects_the_media_stream() {
        let (service, calls) = service(true, Some(ai_config()));
        let instruction = service.handle(incoming(NUMBER)).await;

        match instruction {
            VoiceInstruction::ConnectStream { url, parameters } => {
                assert_eq!(
                    url,
                    "wss://pbx.example.com/webhooks/twilio/ai-media-stream"
                );
                let get = |name: &str| {
                    parameters
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| v.as_str())
                };
                assert_eq!(get("business_name"), Some("Rose Cafe"));
                assert_eq!(get("business_description"), Some("Neighborhood coffee shop"));
                assert_eq!(get("call_sid"), Some("CA1"));
                assert_eq!(get("caller_number"), Some("+15550001111"));
                assert_eq!(get("openai_api_key"), Some("sk-live"));
                assert_eq!(get("custom_instructions"), Some("We close at 5pm."));
            }
            other => panic!("expected connect, got {:?}", other),
        }

        assert_eq!(calls.len().await, 1);
    }

    #[tokio::test]
    async fn test_handoff_for_unknown_call_returns_none() {
        let (service, _) = service(true, Some(ai_config()));
        assert!(service.handle_handoff("CA404").await.is_none());
    }

    #[tokio::test]
    async fn test_handoff_reclassifies_call_and_connects() {
        let (service, calls) = service(true, Some(ai_config()));
        service.handle(incoming(NUMBER)).await;

        let instruction = service.handle_handoff("CA1").await.unwrap();
        assert!(matches!(instruction, VoiceInstruction::ConnectStream { .. }));

        let call = calls
            .find_by_provider_id(&ProviderCallId::new("CA1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(call.call_type(), CallType::Ai);
    }
}
