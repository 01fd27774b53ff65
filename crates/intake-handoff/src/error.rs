//! Error types for the advisor handoff workflow.

/// Errors from the handoff workflow and its collaborators.
///
/// `LeadNotFound` is a reportable business failure carrying actionable
/// guidance, not a crash; the caller renders it into the conversation.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("Turn context is not set; contact address and session id are required")]
    MissingContext,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("{0}")]
    LeadNotFound(String),
    #[error("Transcript record write failed: {0}")]
    RecordWrite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HandoffError::MissingContext;
        assert!(err.to_string().contains("contact address and session id"));

        let err = HandoffError::Validation("conversation summary is required".to_string());
        assert_eq!(
            err.to_string(),
            "Validation failed: conversation summary is required"
        );

        let err = HandoffError::DependencyUnavailable("CRM connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Dependency unavailable: CRM connection refused"
        );

        let err = HandoffError::RecordWrite("task rejected".to_string());
        assert_eq!(
            err.to_string(),
            "Transcript record write failed: task rejected"
        );
    }

    #[test]
    fn test_lead_not_found_carries_guidance_verbatim() {
        let err = HandoffError::LeadNotFound(
            "No lead found for +15551234567. The student may need to fill out the inquiry form first.".to_string(),
        );
        assert!(err.to_string().contains("inquiry form"));
    }

    #[test]
    fn test_errors_implement_debug() {
        let err = HandoffError::Validation("x".to_string());
        assert!(format!("{:?}", err).contains("Validation"));
    }
}
