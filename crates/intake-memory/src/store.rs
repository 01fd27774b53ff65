//! Conversation memory store: append-only turn log per actor and session.
//!
//! The access contract the orchestrator requires is the `MemoryStore` trait;
//! `SqliteMemoryStore` is the bundled implementation. Turns are immutable
//! once written and read order matches write order within a session.

use std::sync::Arc;

use rusqlite::OptionalExtension;

use intake_core::error::IntakeError;
use intake_core::events::Role;
use intake_core::types::MemoryTurn;

use crate::db::Database;

/// Access contract for the durable conversation memory store.
pub trait MemoryStore: Send + Sync {
    /// Append one turn. Exactly one durable write per call.
    fn append_turn(
        &self,
        actor_id: &str,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), IntakeError>;

    /// Fetch up to `k` most recent turns for a session, oldest first.
    fn last_turns(
        &self,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<MemoryTurn>, IntakeError>;
}

/// SQLite-backed memory store.
pub struct SqliteMemoryStore {
    db: Arc<Database>,
}

impl SqliteMemoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn append_turn(
        &self,
        actor_id: &str,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), IntakeError> {
        self.db.with_conn(|conn| {
            let next_seq: i64 = conn
                .query_row(
                    "SELECT MAX(seq) FROM memory_turns
                     WHERE actor_id = ?1 AND session_id = ?2",
                    rusqlite::params![actor_id, session_id],
                    |row| row.get::<_, Option<i64>>(0),
                )
                .optional()
                .map_err(|e| IntakeError::Storage(e.to_string()))?
                .flatten()
                .map(|max| max + 1)
                .unwrap_or(0);

            conn.execute(
                "INSERT INTO memory_turns (actor_id, session_id, role, content, seq)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![actor_id, session_id, role.as_storage(), content, next_seq],
            )
            .map_err(|e| IntakeError::Storage(format!("Failed to append turn: {}", e)))?;
            Ok(())
        })
    }

    fn last_turns(
        &self,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<MemoryTurn>, IntakeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT actor_id, session_id, role, content, seq
                     FROM memory_turns
                     WHERE actor_id = ?1 AND session_id = ?2
                     ORDER BY seq DESC
                     LIMIT ?3",
                )
                .map_err(|e| IntakeError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![actor_id, session_id, k as i64],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    },
                )
                .map_err(|e| IntakeError::Storage(e.to_string()))?;

            let mut turns = Vec::new();
            for row in rows {
                let (actor_id, session_id, role, content, seq) =
                    row.map_err(|e| IntakeError::Storage(e.to_string()))?;
                let role = Role::from_storage(&role).ok_or_else(|| {
                    IntakeError::Storage(format!("Unknown role in memory store: {}", role))
                })?;
                turns.push(MemoryTurn {
                    actor_id,
                    session_id,
                    role,
                    content,
                    seq,
                });
            }
            // Query was newest-first for the LIMIT; flip to oldest-first.
            turns.reverse();
            Ok(turns)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> SqliteMemoryStore {
        SqliteMemoryStore::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_append_and_read_back() {
        let store = make_store();
        store.append_turn("a1", "s1", Role::User, "Hi").unwrap();
        store
            .append_turn("a1", "s1", Role::Assistant, "Hello!")
            .unwrap();

        let turns = store.last_turns("a1", "s1", 10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hi");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[test]
    fn test_read_order_matches_write_order() {
        let store = make_store();
        for i in 0..6 {
            store
                .append_turn("a1", "s1", Role::User, &format!("m{}", i))
                .unwrap();
        }
        let turns = store.last_turns("a1", "s1", 10).unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_bounded_fetch_returns_most_recent_oldest_first() {
        let store = make_store();
        for i in 0..10 {
            store
                .append_turn("a1", "s1", Role::User, &format!("m{}", i))
                .unwrap();
        }
        let turns = store.last_turns("a1", "s1", 3).unwrap();
        assert_eq!(turns.len(), 3);
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        // The 3 most recent turns, oldest first.
        assert_eq!(contents, vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = make_store();
        store.append_turn("a1", "s1", Role::User, "in s1").unwrap();
        store.append_turn("a1", "s2", Role::User, "in s2").unwrap();

        let s1 = store.last_turns("a1", "s1", 10).unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].content, "in s1");
    }

    #[test]
    fn test_actors_are_isolated() {
        let store = make_store();
        store.append_turn("a1", "s1", Role::User, "from a1").unwrap();
        store.append_turn("a2", "s1", Role::User, "from a2").unwrap();

        let a2 = store.last_turns("a2", "s1", 10).unwrap();
        assert_eq!(a2.len(), 1);
        assert_eq!(a2[0].content, "from a2");
    }

    #[test]
    fn test_empty_session_returns_empty() {
        let store = make_store();
        assert!(store.last_turns("a1", "nothing", 5).unwrap().is_empty());
    }

    #[test]
    fn test_seq_is_monotonic_per_session() {
        let store = make_store();
        store.append_turn("a1", "s1", Role::User, "x").unwrap();
        store.append_turn("a1", "s2", Role::User, "y").unwrap();
        store.append_turn("a1", "s1", Role::Assistant, "z").unwrap();

        let turns = store.last_turns("a1", "s1", 10).unwrap();
        assert_eq!(turns[0].seq, 0);
        assert_eq!(turns[1].seq, 1);
    }
}
