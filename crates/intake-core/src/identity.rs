//! Actor identity normalization.
//!
//! Derives a stable actor id from a raw contact address (typically a phone
//! number in E.164 form). The id is used as the memory-store partition key
//! and as a cross-system join key, so normalization must be deterministic
//! and stable across runs.

use crate::error::{IntakeError, Result};

/// Prefix applied when the filtered address does not start with an
/// alphanumeric character (e.g. the address was all punctuation).
const ACTOR_ID_PREFIX: &str = "phone-";

/// Normalize a contact address into a memory-store actor id.
///
/// Strips every character outside `[A-Za-z0-9-_/]`. If the result is empty
/// or does not begin with an alphanumeric character, the fixed
/// `phone-` prefix is prepended to the stripped value.
///
/// Returns `IntakeError::InvalidInput` for an empty address. Any non-empty
/// input produces a non-empty id.
pub fn normalize_actor_id(address: &str) -> Result<String> {
    if address.is_empty() {
        return Err(IntakeError::InvalidInput(
            "contact address is required".to_string(),
        ));
    }

    let cleaned: String = address
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
        .collect();

    let needs_prefix = match cleaned.chars().next() {
        Some(first) => !first.is_ascii_alphanumeric(),
        None => true,
    };

    if needs_prefix {
        Ok(format!("{}{}", ACTOR_ID_PREFIX, cleaned))
    } else {
        Ok(cleaned)
    }
}
