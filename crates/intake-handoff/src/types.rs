//! Request, lead, report, and step-outcome types for the handoff workflow.

use serde::{Deserialize, Serialize};

use crate::error::HandoffError;

/// Consent artifact produced by the reasoning engine.
///
/// Constructed once per handoff attempt and discarded after the workflow
/// completes; it is never retried automatically.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HandoffRequest {
    /// Brief 2-3 sentence summary of the key discussion points.
    #[serde(default)]
    pub conversation_summary: String,
    /// Personalized message to dispatch to the student.
    #[serde(default)]
    pub outbound_message: String,
    /// Comma-separated list of programs mentioned, when any.
    #[serde(default)]
    pub programs_discussed: Option<String>,
    /// Barriers or concerns mentioned by the student, when any.
    #[serde(default)]
    pub concerns: Option<String>,
}

impl HandoffRequest {
    /// Validate the engine-provided fields. The contact address and session
    /// id come from the ambient turn context, not from this request.
    pub fn validate(&self) -> Result<(), HandoffError> {
        if self.conversation_summary.is_empty() {
            return Err(HandoffError::Validation(
                "conversation summary is required".to_string(),
            ));
        }
        if self.outbound_message.is_empty() {
            return Err(HandoffError::Validation(
                "outbound message is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fields for a lead record to be created in the CRM, typically from an
/// inquiry form submission.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewLead {
    #[serde(default)]
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Free-text notes (campus, program type, and so on).
    #[serde(default)]
    pub description: String,
    pub source: String,
    pub status: String,
}

/// A lead record as stored in the external CRM.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: String,
}

impl LeadRecord {
    /// Full name with empty parts elided.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Outcome of a single workflow step.
///
/// The orchestrator folds over steps: `Recoverable` failures collect as
/// warnings and the workflow continues; `Fatal` halts it.
#[derive(Debug)]
pub enum StepOutcome {
    Ok,
    Recoverable(String),
    Fatal(HandoffError),
}

/// Structured success summary returned by the workflow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandoffReport {
    pub lead_id: String,
    pub lead_name: String,
    pub lead_phone: String,
    pub task_id: String,
    /// Whether the lead status update (step 4) succeeded.
    pub status_updated: bool,
    /// Whether the outbound message dispatch (step 6) succeeded.
    pub message_dispatched: bool,
    /// Warnings from recoverable step failures.
    pub warnings: Vec<String>,
}

impl HandoffReport {
    /// Render the report as the human-readable tool result relayed into the
    /// conversation.
    pub fn render(&self) -> String {
        let message_line = if self.message_dispatched {
            "Confirmation message sent to the student"
        } else {
            "Confirmation message could not be sent"
        };
        let mut out = format!(
            "Advisor handoff complete.\n\n\
             Lead Details:\n\
             - Name: {}\n\
             - Lead ID: {}\n\
             - Status: Working\n\
             - Phone: {}\n\n\
             Actions Taken:\n\
             - Conversation logged (Task ID: {})\n\
             - {}\n\
             - An advisor will contact the student as discussed",
            self.lead_name, self.lead_id, self.lead_phone, self.task_id, message_line
        );
        if !self.warnings.is_empty() {
            out.push_str("\n\nWarnings:\n");
            for w in &self.warnings {
                out.push_str(&format!("- {}\n", w));
            }
        }
        out
    }
}

/// Normalize a contact address to the digits used for CRM lookup: keep only
/// ASCII digits and take the last 10.
pub fn phone_digits_suffix(address: &str) -> String {
    let digits: Vec<char> = address.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(10);
    digits[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Request validation ----

    #[test]
    fn test_request_requires_summary() {
        let req = HandoffRequest {
            outbound_message: "We will reach out".to_string(),
            ..HandoffRequest::default()
        };
        let err = req.validate().unwrap_err();
        assert!(matches!(err, HandoffError::Validation(_)));
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_request_requires_outbound_message() {
        let req = HandoffRequest {
            conversation_summary: "Interested in MBA".to_string(),
            ..HandoffRequest::default()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("outbound message"));
    }

    #[test]
    fn test_request_with_both_fields_valid() {
        let req = HandoffRequest {
            conversation_summary: "s".to_string(),
            outbound_message: "m".to_string(),
            programs_discussed: Some("MBA".to_string()),
            concerns: None,
        };
        assert!(req.validate().is_ok());
    }

    // ---- Lead ----

    #[test]
    fn test_full_name_joins_parts() {
        let lead = LeadRecord {
            id: "L1".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            phone: "+15551234567".to_string(),
            status: "New".to_string(),
        };
        assert_eq!(lead.full_name(), "Ana Reyes");
    }

    #[test]
    fn test_full_name_elides_empty_parts() {
        let lead = LeadRecord {
            id: "L1".to_string(),
            first_name: "Ana".to_string(),
            last_name: String::new(),
            phone: String::new(),
            status: String::new(),
        };
        assert_eq!(lead.full_name(), "Ana");
    }

    // ---- Phone suffix ----

    #[test]
    fn test_phone_suffix_last_10_digits() {
        assert_eq!(phone_digits_suffix("+15551234567"), "5551234567");
    }

    #[test]
    fn test_phone_suffix_short_number_kept_whole() {
        assert_eq!(phone_digits_suffix("12345"), "12345");
    }

    #[test]
    fn test_phone_suffix_strips_punctuation() {
        assert_eq!(phone_digits_suffix("+1 (555) 123-4567"), "5551234567");
    }

    #[test]
    fn test_phone_suffix_empty_for_no_digits() {
        assert_eq!(phone_digits_suffix("n/a"), "");
    }

    // ---- Report rendering ----

    fn sample_report() -> HandoffReport {
        HandoffReport {
            lead_id: "L1".to_string(),
            lead_name: "Ana Reyes".to_string(),
            lead_phone: "+15551234567".to_string(),
            task_id: "T9".to_string(),
            status_updated: true,
            message_dispatched: true,
            warnings: vec![],
        }
    }

    #[test]
    fn test_report_render_success() {
        let rendered = sample_report().render();
        assert!(rendered.contains("Advisor handoff complete."));
        assert!(rendered.contains("Name: Ana Reyes"));
        assert!(rendered.contains("Task ID: T9"));
        assert!(rendered.contains("Confirmation message sent"));
        assert!(!rendered.contains("Warnings:"));
    }

    #[test]
    fn test_report_render_with_warnings() {
        let report = HandoffReport {
            status_updated: false,
            message_dispatched: false,
            warnings: vec!["Lead status update failed".to_string()],
            ..sample_report()
        };
        let rendered = report.render();
        assert!(rendered.contains("could not be sent"));
        assert!(rendered.contains("Warnings:"));
        assert!(rendered.contains("Lead status update failed"));
    }
}
