//! The advisor handoff workflow: a straight-line sequence of steps with
//! per-step failure policy.
//!
//! A step either succeeds, fails recoverably (the workflow continues and the
//! failure surfaces as a warning in the report), or fails fatally (the
//! workflow halts and no later step runs). The policy per step:
//!
//! 1. Context check — fatal when the turn context is missing the contact
//!    address or session id.
//! 2. Request validation — fatal.
//! 3. CRM connect + lead lookup — fatal; a missing lead is `LeadNotFound`.
//! 4. Lead status update — recoverable.
//! 5. Transcript task creation — fatal; the permanent record must exist
//!    before anything tells the student an advisor is coming.
//! 6. Outbound message dispatch — recoverable.

use std::sync::Arc;

use tracing::{info, warn};

use intake_core::identity::normalize_actor_id;
use intake_core::types::TurnContext;
use intake_memory::MemoryGateway;

use crate::crm::CrmClient;
use crate::error::HandoffError;
use crate::messaging::MessageGateway;
use crate::transcript::compose_transcript_record;
use crate::types::{phone_digits_suffix, HandoffReport, HandoffRequest, StepOutcome};

const LEAD_STATUS_WORKING: &str = "Working";
const TASK_SUBJECT: &str = "Chatbot Conversation - Advisor Handoff";

/// Orchestrates the handoff steps against pluggable CRM and messaging
/// backends.
pub struct HandoffOrchestrator {
    crm: Arc<dyn CrmClient>,
    messaging: Arc<dyn MessageGateway>,
    memory: Arc<MemoryGateway>,
    max_history_turns: usize,
}

impl HandoffOrchestrator {
    pub fn new(
        crm: Arc<dyn CrmClient>,
        messaging: Arc<dyn MessageGateway>,
        memory: Arc<MemoryGateway>,
        max_history_turns: usize,
    ) -> Self {
        Self {
            crm,
            messaging,
            memory,
            max_history_turns,
        }
    }

    /// Run the full workflow for one consented handoff.
    pub async fn run(
        &self,
        request: &HandoffRequest,
        ctx: &TurnContext,
    ) -> Result<HandoffReport, HandoffError> {
        if ctx.contact_address.is_empty() || ctx.session_id.is_empty() {
            return Err(HandoffError::MissingContext);
        }
        request.validate()?;

        // Best effort: a missing transcript must not block the handoff, the
        // summary stands in for it.
        let history = match normalize_actor_id(&ctx.contact_address) {
            Ok(actor_id) => {
                self.memory
                    .fetch_history(&actor_id, &ctx.session_id, self.max_history_turns)
            }
            Err(_) => String::new(),
        };

        self.crm.connect().await?;

        let suffix = phone_digits_suffix(&ctx.contact_address);
        let lead = self
            .crm
            .find_lead_by_phone(&suffix)
            .await?
            .ok_or_else(|| {
                HandoffError::LeadNotFound(format!(
                    "No lead record was found for {}. The student may need to \
                     fill out the inquiry form first.",
                    ctx.contact_address
                ))
            })?;
        info!(lead_id = %lead.id, "lead matched for handoff");

        let mut warnings = Vec::new();

        let status_updated = match self.update_status(&lead.id).await {
            StepOutcome::Ok => true,
            StepOutcome::Recoverable(reason) => {
                warnings.push(reason);
                false
            }
            StepOutcome::Fatal(e) => return Err(e),
        };

        let record = compose_transcript_record(request, &ctx.session_id, &history);
        let task_id = self
            .crm
            .create_task(&lead.id, TASK_SUBJECT, &record)
            .await
            .map_err(|e| HandoffError::RecordWrite(e.to_string()))?;
        info!(task_id = %task_id, "conversation record written");

        let message_dispatched = match self.dispatch(ctx, &request.outbound_message).await {
            StepOutcome::Ok => true,
            StepOutcome::Recoverable(reason) => {
                warnings.push(reason);
                false
            }
            StepOutcome::Fatal(e) => return Err(e),
        };

        Ok(HandoffReport {
            lead_id: lead.id.clone(),
            lead_name: lead.full_name(),
            lead_phone: ctx.contact_address.clone(),
            task_id,
            status_updated,
            message_dispatched,
            warnings,
        })
    }

    async fn update_status(&self, lead_id: &str) -> StepOutcome {
        match self
            .crm
            .update_lead_status(lead_id, LEAD_STATUS_WORKING)
            .await
        {
            Ok(()) => StepOutcome::Ok,
            Err(e) => {
                warn!(lead_id, error = %e, "lead status update failed, continuing");
                StepOutcome::Recoverable(format!("Lead status update failed: {}", e))
            }
        }
    }

    async fn dispatch(&self, ctx: &TurnContext, body: &str) -> StepOutcome {
        match self.messaging.send(&ctx.contact_address, body).await {
            Ok(message_id) => {
                info!(message_id = %message_id, "confirmation message dispatched");
                StepOutcome::Ok
            }
            Err(e) => {
                warn!(error = %e, "confirmation dispatch failed, continuing");
                StepOutcome::Recoverable(format!("Confirmation message dispatch failed: {}", e))
            }
        }
    }
}
