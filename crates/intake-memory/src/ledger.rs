//! Session ledger: which conversation sessions a contact has been seen in.
//!
//! One row per contact address holding the append-only, de-duplicated set of
//! session ids plus the latest-session pointer and last-seen timestamps.
//! Safe to call once per turn: repeating a session id within the same
//! session updates the pointer without duplicating the entry.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::{info, warn};

use intake_core::error::IntakeError;

use crate::db::Database;

/// Result of tracking a `(contact, session)` pair.
///
/// Store failures are caught here and surfaced as `Failed` so the caller
/// can proceed without session tracking rather than aborting the turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    /// First time this contact was seen; a singleton session list was created.
    Created { total_sessions: usize },
    /// Contact already known; the session set and latest pointer were refreshed.
    Updated { total_sessions: usize },
    /// The store was unreachable or the write failed.
    Failed { reason: String },
}

/// Ledger of per-contact conversation sessions.
pub struct SessionLedger {
    db: Arc<Database>,
}

impl SessionLedger {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record that `session_id` was seen for `contact_address`.
    ///
    /// Always refreshes the latest-session pointer and last-seen date/time.
    /// The session list is append-only and de-duplicated.
    pub fn track(&self, contact_address: &str, session_id: &str) -> TrackOutcome {
        match self.track_inner(contact_address, session_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(contact = %contact_address, error = %e, "Session tracking failed");
                TrackOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Look up the session list for a contact. Returns None for an unknown
    /// contact.
    pub fn sessions_for(&self, contact_address: &str) -> Result<Option<Vec<String>>, IntakeError> {
        self.db.with_conn(|conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT sessions FROM contact_sessions WHERE contact_address = ?1",
                    rusqlite::params![contact_address],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| IntakeError::Storage(e.to_string()))?;
            match json {
                Some(json) => {
                    let sessions: Vec<String> = serde_json::from_str(&json)?;
                    Ok(Some(sessions))
                }
                None => Ok(None),
            }
        })
    }

    fn track_inner(
        &self,
        contact_address: &str,
        session_id: &str,
    ) -> Result<TrackOutcome, IntakeError> {
        let now = Utc::now();
        let date = now.format("%Y-%m-%d").to_string();
        let time = now.format("%H:%M:%S").to_string();

        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT sessions FROM contact_sessions WHERE contact_address = ?1",
                    rusqlite::params![contact_address],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| IntakeError::Storage(e.to_string()))?;

            match existing {
                Some(json) => {
                    let mut sessions: Vec<String> = serde_json::from_str(&json)?;
                    if !sessions.iter().any(|s| s == session_id) {
                        sessions.push(session_id.to_string());
                    }
                    let total = sessions.len();
                    conn.execute(
                        "UPDATE contact_sessions
                         SET sessions = ?2, latest_session_id = ?3,
                             last_seen_date = ?4, last_seen_time = ?5
                         WHERE contact_address = ?1",
                        rusqlite::params![
                            contact_address,
                            serde_json::to_string(&sessions)?,
                            session_id,
                            date,
                            time,
                        ],
                    )
                    .map_err(|e| IntakeError::Storage(e.to_string()))?;
                    Ok(TrackOutcome::Updated {
                        total_sessions: total,
                    })
                }
                None => {
                    let sessions = vec![session_id.to_string()];
                    conn.execute(
                        "INSERT INTO contact_sessions
                             (contact_address, sessions, latest_session_id,
                              last_seen_date, last_seen_time)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        rusqlite::params![
                            contact_address,
                            serde_json::to_string(&sessions)?,
                            session_id,
                            date,
                            time,
                        ],
                    )
                    .map_err(|e| IntakeError::Storage(e.to_string()))?;
                    info!(contact = %contact_address, session = %session_id, "New contact tracked");
                    Ok(TrackOutcome::Created { total_sessions: 1 })
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ledger() -> SessionLedger {
        SessionLedger::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_first_contact_creates_record() {
        let ledger = make_ledger();
        let outcome = ledger.track("+15551234567", "s1");
        assert_eq!(outcome, TrackOutcome::Created { total_sessions: 1 });
    }

    #[test]
    fn test_repeat_session_is_idempotent() {
        let ledger = make_ledger();
        ledger.track("+15551234567", "s1");
        let outcome = ledger.track("+15551234567", "s1");
        // Second track of the same pair updates without duplicating.
        assert_eq!(outcome, TrackOutcome::Updated { total_sessions: 1 });
        let sessions = ledger.sessions_for("+15551234567").unwrap().unwrap();
        assert_eq!(sessions, vec!["s1".to_string()]);
    }

    #[test]
    fn test_new_session_appended() {
        let ledger = make_ledger();
        ledger.track("+15551234567", "s1");
        let outcome = ledger.track("+15551234567", "s2");
        assert_eq!(outcome, TrackOutcome::Updated { total_sessions: 2 });
        let sessions = ledger.sessions_for("+15551234567").unwrap().unwrap();
        assert_eq!(sessions, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn test_latest_pointer_refreshed() {
        let ledger = make_ledger();
        ledger.track("+15551234567", "s1");
        ledger.track("+15551234567", "s2");
        ledger.track("+15551234567", "s1");
        let latest: String = ledger
            .db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT latest_session_id FROM contact_sessions WHERE contact_address = ?1",
                    rusqlite::params!["+15551234567"],
                    |row| row.get(0),
                )
                .map_err(|e| IntakeError::Storage(e.to_string()))
            })
            .unwrap();
        // Latest pointer always equals the most recently seen session id.
        assert_eq!(latest, "s1");
        let sessions = ledger.sessions_for("+15551234567").unwrap().unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_contacts_are_isolated() {
        let ledger = make_ledger();
        ledger.track("+15551234567", "s1");
        ledger.track("+15559876543", "s2");
        assert_eq!(
            ledger.sessions_for("+15551234567").unwrap().unwrap(),
            vec!["s1".to_string()]
        );
        assert_eq!(
            ledger.sessions_for("+15559876543").unwrap().unwrap(),
            vec!["s2".to_string()]
        );
    }

    #[test]
    fn test_unknown_contact_is_none() {
        let ledger = make_ledger();
        assert!(ledger.sessions_for("+10000000000").unwrap().is_none());
    }
}
