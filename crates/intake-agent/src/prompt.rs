//! Prompt composition for the admissions assistant persona.

use intake_core::config::UniversityConfig;

use crate::tools::{TOOL_HANDOFF, TOOL_RETRIEVE, TOOL_TRANSLATE};

/// Build the system instruction: persona, conversation guidance, and tool
/// usage rules.
pub fn compose_system_prompt(university: &UniversityConfig) -> String {
    format!(
        "You are a friendly and personable admissions chat assistant for {name} ({short}). \
         Your mission is to have genuine, helpful conversations with prospective students, \
         understand their educational goals and concerns, and guide interested students toward \
         connecting with an admissions advisor.\n\n\
         Conversation style:\n\
         - Be conversational, warm, and supportive, never robotic or transactional.\n\
         - Ask open-ended questions and reference things the student mentioned earlier.\n\
         - Keep responses concise. Do not overwhelm the student with information.\n\n\
         Tools:\n\
         - `{retrieve}`: use when the student asks specific questions about programs, \
         requirements, costs, deadlines, or facilities. Never invent details.\n\
         - `{handoff}`: use ONLY after the student explicitly agrees to be contacted by an \
         advisor. Provide a 2-3 sentence conversation summary and a personalized outbound \
         message. Never use this tool without explicit consent.\n\
         - `{translate}`: use when the student writes in another language or asks for a \
         translation.\n\n\
         If the student declines advisor contact, respect their decision and continue being \
         helpful.",
        name = university.name,
        short = university.short_name,
        retrieve = TOOL_RETRIEVE,
        handoff = TOOL_HANDOFF,
        translate = TOOL_TRANSLATE,
    )
}

/// Build the per-turn user prompt, prefixing recent history when any exists.
pub fn compose_user_prompt(history: &str, prompt: &str) -> String {
    if history.is_empty() {
        format!("Current user query: {}", prompt)
    } else {
        format!(
            "Recent conversation history:\n{}\n\nCurrent user query: {}",
            history, prompt
        )
    }
}
