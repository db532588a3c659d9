//! Delivery channel abstraction and the HTTP-backed email/SMS transports.
//!
//! Transports are injected into the dispatcher as `Arc<dyn DeliveryChannel>`,
//! which lets tests substitute recording doubles.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::{EmailConfig, SmsConfig};

use super::template::RenderedMessage;
use super::ChannelKind;

/// Errors that can occur when sending through a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No provider credentials; callers treat this as a skip, not a failure
    #[error("Channel is not configured")]
    NotConfigured,

    /// Provider answered with a non-success status
    #[error("Provider rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Request could not be completed
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChannelError::Transport(format!("request timed out: {}", err))
        } else {
            ChannelError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Send `content` to `to` (an email address or phone number)
    async fn send(&self, to: &str, content: &RenderedMessage) -> Result<(), ChannelError>;
}

/// Longest provider error body kept in a [`ChannelError::Rejected`]
const MAX_ERROR_BODY: usize = 256;

async fn check_response(response: reqwest::Response) -> Result<(), ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }

    Err(ChannelError::Rejected {
        status: status.as_u16(),
        body,
    })
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client with timeout, using default");
            reqwest::Client::new()
        })
}

/// Email over a JSON HTTP API authenticated with a bearer key.
///
/// Request body: `{"from", "to": [..], "subject", "text"}`.
pub struct HttpEmailTransport {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpEmailTransport {
    pub fn new(config: EmailConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

#[async_trait]
impl DeliveryChannel for HttpEmailTransport {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, to: &str, content: &RenderedMessage) -> Result<(), ChannelError> {
        let (Some(api_key), Some(from)) = (&self.config.api_key, &self.config.from_address) else {
            return Err(ChannelError::NotConfigured);
        };
        if !self.config.is_configured() {
            return Err(ChannelError::NotConfigured);
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&json!({
                "from": from,
                "to": [to],
                "subject": content.subject,
                "text": content.text,
            }))
            .send()
            .await?;

        check_response(response).await
    }
}

/// SMS over a JSON HTTP gateway authenticated with a bearer key.
///
/// Request body: `{"from", "to", "body"}`.
pub struct HttpSmsTransport {
    client: reqwest::Client,
    config: SmsConfig,
}

impl HttpSmsTransport {
    pub fn new(config: SmsConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

#[async_trait]
impl DeliveryChannel for HttpSmsTransport {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, to: &str, content: &RenderedMessage) -> Result<(), ChannelError> {
        let (Some(api_key), Some(from)) = (&self.config.api_key, &self.config.from_number) else {
            return Err(ChannelError::NotConfigured);
        };
        if !self.config.is_configured() {
            return Err(ChannelError::NotConfigured);
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&json!({
                "from": from,
                "to": to,
                "body": content.sms_text(),
            }))
            .send()
            .await?;

        check_response(response).await
    }
}
