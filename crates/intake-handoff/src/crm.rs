//! CRM client seam: lead lookup, status updates, and activity task creation.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use intake_core::config::CrmConfig;

use crate::error::HandoffError;
use crate::types::{LeadRecord, NewLead};

/// Operations the workflow needs from the CRM backend.
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Establish (or verify) a connection. Called once per workflow run.
    async fn connect(&self) -> Result<(), HandoffError>;

    /// Look up a lead whose phone number ends with the given digit suffix.
    async fn find_lead_by_phone(&self, suffix: &str) -> Result<Option<LeadRecord>, HandoffError>;

    /// Create a new lead record, returning its id.
    async fn create_lead(&self, lead: &NewLead) -> Result<String, HandoffError>;

    /// Move a lead to the given status.
    async fn update_lead_status(&self, lead_id: &str, status: &str) -> Result<(), HandoffError>;

    /// Create a completed activity task attached to the lead, returning the
    /// new task id.
    async fn create_task(
        &self,
        lead_id: &str,
        subject: &str,
        description: &str,
    ) -> Result<String, HandoffError>;
}

/// HTTP-backed CRM client.
pub struct HttpCrmClient {
    client: reqwest::Client,
    config: CrmConfig,
}

impl HttpCrmClient {
    pub fn new(config: CrmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, HandoffError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| HandoffError::DependencyUnavailable(format!("CRM request failed: {}", e)))?;

        let status = resp.status();
        let value: Value = resp.json().await.map_err(|e| {
            HandoffError::DependencyUnavailable(format!("CRM response was not JSON: {}", e))
        })?;
        if !status.is_success() {
            return Err(HandoffError::DependencyUnavailable(format!(
                "CRM returned {}: {}",
                status, value
            )));
        }
        Ok(value)
    }
}

#[async_trait]
impl CrmClient for HttpCrmClient {
    async fn connect(&self) -> Result<(), HandoffError> {
        if !self.config.has_credentials() {
            return Err(HandoffError::DependencyUnavailable(
                "CRM credentials are not configured".to_string(),
            ));
        }
        let body = json!({
            "username": self.config.username,
            "password": format!("{}{}", self.config.password, self.config.security_token),
        });
        self.post("auth/login", body).await?;
        debug!("CRM connection established");
        Ok(())
    }

    async fn find_lead_by_phone(&self, suffix: &str) -> Result<Option<LeadRecord>, HandoffError> {
        let body = json!({ "phone_suffix": suffix });
        let value = self.post("leads/search", body).await?;
        let records = value
            .get("records")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        match records.into_iter().next() {
            Some(record) => {
                let lead: LeadRecord = serde_json::from_value(record).map_err(|e| {
                    HandoffError::DependencyUnavailable(format!(
                        "CRM lead record malformed: {}",
                        e
                    ))
                })?;
                Ok(Some(lead))
            }
            None => {
                debug!(suffix, "no lead matched phone suffix");
                Ok(None)
            }
        }
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<String, HandoffError> {
        let value = self.post("leads", serde_json::to_value(lead).unwrap_or_default()).await?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| HandoffError::RecordWrite("CRM lead response missing an id".to_string()))
    }

    async fn update_lead_status(&self, lead_id: &str, status: &str) -> Result<(), HandoffError> {
        let body = json!({ "id": lead_id, "status": status });
        match self.post("leads/update", body).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(lead_id, error = %e, "lead status update failed");
                Err(e)
            }
        }
    }

    async fn create_task(
        &self,
        lead_id: &str,
        subject: &str,
        description: &str,
    ) -> Result<String, HandoffError> {
        let body = json!({
            "lead_id": lead_id,
            "subject": subject,
            "description": description,
            "status": "Completed",
        });
        let value = self.post("tasks", body).await?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| {
                HandoffError::RecordWrite("CRM task response missing an id".to_string())
            })
    }
}
