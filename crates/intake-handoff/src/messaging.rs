//! Outbound message dispatch seam.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use intake_core::config::MessagingConfig;

use crate::error::HandoffError;

/// Sends a message to a contact, returning the provider message id.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<String, HandoffError>;
}

/// HTTP gateway that posts dispatch requests to a queue endpoint.
pub struct HttpMessageGateway {
    client: reqwest::Client,
    config: MessagingConfig,
    source: String,
}

impl HttpMessageGateway {
    pub fn new(config: MessagingConfig, source: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            config,
            source: source.into(),
        }
    }

    /// Ensure the address carries a leading `+` so downstream providers
    /// treat it as E.164.
    fn e164(address: &str) -> String {
        if address.starts_with('+') {
            address.to_string()
        } else {
            format!("+{}", address)
        }
    }
}

#[async_trait]
impl MessageGateway for HttpMessageGateway {
    async fn send(&self, to: &str, body: &str) -> Result<String, HandoffError> {
        if self.config.queue_url.is_empty() {
            return Err(HandoffError::DependencyUnavailable(
                "messaging queue URL is not configured".to_string(),
            ));
        }
        let payload = json!({
            "phone_number": Self::e164(to),
            "message": body,
            "timestamp": Utc::now().to_rfc3339(),
            "message_type": "advisor_handoff",
            "source": self.source,
        });
        let resp = self
            .client
            .post(&self.config.queue_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                HandoffError::DependencyUnavailable(format!("message dispatch failed: {}", e))
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HandoffError::DependencyUnavailable(format!(
                "message queue returned {}",
                status
            )));
        }
        let value: Value = resp.json().await.unwrap_or(Value::Null);
        let message_id = value
            .get("message_id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        debug!(message_id, "outbound message queued");
        Ok(message_id)
    }
}
