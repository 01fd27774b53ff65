//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use intake_core::error::IntakeError;

/// Thread-safe SQLite database wrapper.
///
/// Uses WAL mode for concurrent read/write safety. The connection is
/// wrapped in a Mutex since rusqlite Connection is not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode, synchronous=NORMAL, foreign keys, and creates
    /// the schema if it does not exist yet.
    pub fn new(path: &Path) -> Result<Self, IntakeError> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| IntakeError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| IntakeError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(init_schema)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, IntakeError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| IntakeError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| IntakeError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(init_schema)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// This is the primary way to interact with the database. The mutex
    /// is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, IntakeError>
    where
        F: FnOnce(&Connection) -> Result<T, IntakeError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IntakeError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

/// Create the ledger and memory tables if they do not exist.
fn init_schema(conn: &Connection) -> Result<(), IntakeError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS contact_sessions (
             contact_address   TEXT PRIMARY KEY,
             sessions          TEXT NOT NULL,
             latest_session_id TEXT NOT NULL,
             last_seen_date    TEXT NOT NULL,
             last_seen_time    TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS memory_turns (
             id         INTEGER PRIMARY KEY AUTOINCREMENT,
             actor_id   TEXT NOT NULL,
             session_id TEXT NOT NULL,
             role       TEXT NOT NULL,
             content    TEXT NOT NULL,
             seq        INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_memory_turns_session
             ON memory_turns (actor_id, session_id, seq);",
    )
    .map_err(|e| IntakeError::Storage(format!("Failed to create schema: {}", e)))
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
