//! Voice control documents (TwiML)
//!
//! A webhook answers the provider with a small declarative XML document
//! telling it what to do with the call leg.

/// Instruction returned to the telephony provider for one call leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceInstruction {
    /// Signal busy and drop the call
    Reject,
    /// Speak a message, then hang up
    SayHangup { message: String },
    /// Speak a message, record the rest of the call, then hang up
    SayRecordHangup {
        message: String,
        action: String,
        status_callback: String,
    },
    /// Open a duplex media stream to the given WebSocket endpoint,
    /// passing the parameters as part of the stream handshake
    ConnectStream {
        url: String,
        parameters: Vec<(String, String)>,
    },
}

impl VoiceInstruction {
    /// Render the instruction as provider XML
    pub fn to_xml(&self) -> String {
        match self {
            VoiceInstruction::Reject => "<Response><Busy/></Response>".to_string(),
            VoiceInstruction::SayHangup { message } => format!(
                "<Response><Say>{}</Say><Hangup/></Response>",
                escape_text(message)
            ),
            VoiceInstruction::SayRecordHangup {
                message,
                action,
                status_callback,
            } => format!(
                "<Response><Say>{}</Say><Record action=\"{}\" recordingStatusCallback=\"{}\"/><Hangup/></Response>",
                escape_text(message),
                escape_attr(action),
                escape_attr(status_callback)
            ),
            VoiceInstruction::ConnectStream { url, parameters } => {
                let params: String = parameters
                    .iter()
                    .map(|(name, value)| {
                        format!(
                            "<Parameter name=\"{}\" value=\"{}\"/>",
                            escape_attr(name),
                            escape_attr(value)
                        )
                    })
                    .collect();
                format!(
                    "<Response><Connect><Stream url=\"{}\">{}</Stream></Connect></Response>",
                    escape_attr(url),
                    params
                )
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_renders_busy() {
        assert_eq!(
            VoiceInstruction::Reject.to_xml(),
            "<Response><Busy/></Response>"
        );
    }

    #[test]
    fn test_say_hangup_escapes_message() {
        let xml = VoiceInstruction::SayHangup {
            message: "Sorry, A & B <closed>".to_string(),
        }
        .to_xml();
        assert_eq!(
            xml,
            "<Response><Say>Sorry, A &amp; B &lt;closed&gt;</Say><Hangup/></Response>"
        );
    }

    #[test]
    fn test_say_record_hangup_renders_callbacks() {
        let xml = VoiceInstruction::SayRecordHangup {
            message: "Please leave a message".to_string(),
            action: "/webhooks/twilio/recording-complete".to_string(),
            status_callback: "/webhooks/twilio/recording-status".to_string(),
        }
        .to_xml();
        assert!(xml.contains("<Say>Please leave a message</Say>"));
        assert!(xml.contains("action=\"/webhooks/twilio/recording-complete\""));
        assert!(xml.contains("recordingStatusCallback=\"/webhooks/twilio/recording-status\""));
        assert!(xml.ends_with("<Hangup/></Response>"));
    }

    #[test]
    fn test_connect_stream_renders_parameters_in_order() {
        let xml = VoiceInstruction::ConnectStream {
            url: "wss://pbx.example.com/webhooks/twilio/ai-media-stream".to_string(),
            parameters: vec![
                ("business_name".to_string(), "Rose \"&\" Thorn".to_string()),
                ("call_sid".to_string(), "CA1".to_string()),
            ],
        }
        .to_xml();
        assert!(xml.starts_with(
            "<Response><Connect><Stream url=\"wss://pbx.example.com/webhooks/twilio/ai-media-stream\">"
        ));
        let name_pos = xml.find("business_name").unwrap();
        let sid_pos = xml.find("call_sid").unwrap();
        assert!(name_pos < sid_pos);
        assert!(xml.contains("value=\"Rose &quot;&amp;&quot; Thorn\""));
    }
}
