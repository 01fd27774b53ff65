//! Composition of the permanent conversation record written to the CRM.

use chrono::Utc;

use crate::types::HandoffRequest;

const HEADER_RULE: &str =
    "======================================================================";

/// Compose the full activity-task description: a header block with handoff
/// metadata, the engine's summary, and the rendered chat history.
pub fn compose_transcript_record(
    request: &HandoffRequest,
    session_id: &str,
    history: &str,
) -> String {
    let mut record = String::new();
    record.push_str(HEADER_RULE);
    record.push('\n');
    record.push_str("ADVISOR HANDOFF - COMPLETE CONVERSATION RECORD\n");
    record.push_str(HEADER_RULE);
    record.push('\n');
    record.push_str(&format!("Timestamp: {}\n", Utc::now().to_rfc3339()));
    record.push_str(&format!("Session ID: {}\n", session_id));
    if let Some(programs) = &request.programs_discussed {
        if !programs.is_empty() {
            record.push_str(&format!("Programs Discussed: {}\n", programs));
        }
    }
    if let Some(concerns) = &request.concerns {
        if !concerns.is_empty() {
            record.push_str(&format!("Concerns: {}\n", concerns));
        }
    }
    record.push('\n');
    record.push_str("CONVERSATION SUMMARY\n");
    record.push_str(&format!("{}\n\n", request.conversation_summary));
    record.push_str("FULL CHAT TRANSCRIPT\n");
    if history.is_empty() {
        record.push_str("(no prior conversation history available)\n");
    } else {
        record.push_str(history);
        record.push('\n');
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HandoffRequest {
        HandoffRequest {
            conversation_summary: "Student asked about the MBA program.".to_string(),
            outbound_message: "An advisor will call you.".to_string(),
            programs_discussed: Some("MBA".to_string()),
            concerns: Some("Tuition cost".to_string()),
        }
    }

    #[test]
    fn test_record_contains_metadata_and_history() {
        let record = compose_transcript_record(
            &request(),
            "session-1",
            "User: Hi\nAssistant: Hello",
        );
        assert!(record.contains("ADVISOR HANDOFF - COMPLETE CONVERSATION RECORD"));
        assert!(record.contains("Session ID: session-1"));
        assert!(record.contains("Programs Discussed: MBA"));
        assert!(record.contains("Concerns: Tuition cost"));
        assert!(record.contains("CONVERSATION SUMMARY"));
        assert!(record.contains("Student asked about the MBA program."));
        assert!(record.contains("User: Hi\nAssistant: Hello"));
    }

    #[test]
    fn test_record_marks_missing_history() {
        let record = compose_transcript_record(&request(), "session-1", "");
        assert!(record.contains("(no prior conversation history available)"));
    }

    #[test]
    fn test_record_omits_empty_optional_lines() {
        let req = HandoffRequest {
            programs_discussed: None,
            concerns: Some(String::new()),
            ..request()
        };
        let record = compose_transcript_record(&req, "s", "h");
        assert!(!record.contains("Programs Discussed:"));
        assert!(!record.contains("Concerns:"));
    }
}
