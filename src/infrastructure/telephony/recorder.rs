//! Call recording control via the provider REST API

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("recording request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("recording request rejected with status {0}")]
    Rejected(u16),
}

/// Port for starting a recording on the telephony leg of a call
///
/// Recording start is fire-and-forget from the bridge's point of view: a
/// failure is logged, never fatal to the conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallRecorder: Send + Sync {
    async fn start(&self, provider_call_id: &str, callback_url: &str)
        -> Result<(), RecorderError>;
}

/// REST adapter that asks the provider to record a live call
pub struct HttpCallRecorder {
    http: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
}

impl HttpCallRecorder {
    pub fn new(api_base: String, account_sid: String, auth_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            account_sid,
            auth_token,
        }
    }
}

#[async_trait]
impl CallRecorder for HttpCallRecorder {
    async fn start(
        &self,
        provider_call_id: &str,
        callback_url: &str,
    ) -> Result<(), RecorderError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}/Recordings.json",
            self.api_base, self.account_sid, provider_call_id
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("RecordingStatusCallback", callback_url),
                ("RecordingStatusCallbackMethod", "POST"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecorderError::Rejected(response.status().as_u16()));
        }

        info!(call_sid = provider_call_id, "Recording started");
        Ok(())
    }
}

/// No-op recorder for tests and deployments without provider credentials
pub struct NoopCallRecorder;

#[async_trait]
impl CallRecorder for NoopCallRecorder {
    async fn start(
        &self,
        provider_call_id: &str,
        _callback_url: &str,
    ) -> Result<(), RecorderError> {
        debug!(call_sid = provider_call_id, "Recording disabled, skipping");
        Ok(())
    }
}
