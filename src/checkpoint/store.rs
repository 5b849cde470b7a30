//! Append-oriented checkpoint store over `SQLite`.
//!
//! Every engine step inserts a new record under the thread's next sequence
//! number; prior records are never overwritten or deleted, so the full step
//! history of a thread remains available for audit and crash recovery.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::state::ConversationState;
use crate::models::thread::ThreadHandle;
use crate::{AppError, Result};

use super::schema;

/// One persisted checkpoint record.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    /// Unique record identifier.
    pub id: String,
    /// Owning thread key.
    pub thread_id: String,
    /// Per-thread sequence number, starting at 1.
    pub seq: i64,
    /// Label of the node (or lifecycle event) that produced this state.
    pub node: String,
    /// State snapshot at this step.
    pub state: ConversationState,
    /// Set when this step suspended awaiting a confirmation value.
    pub interrupt_prompt: Option<String>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Store wrapper around a `SQLite` pool for checkpoint records.
#[derive(Clone)]
pub struct CheckpointStore {
    pool: SqlitePool,
}

impl CheckpointStore {
    /// Open (creating if missing) a file-backed store and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the connection or schema application fails.
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| AppError::Db(format!("failed to create db dir: {err}")))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        schema::bootstrap_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory store (tests).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the connection or schema application fails.
    pub async fn connect_memory() -> Result<Self> {
        // A single connection keeps every query on the same in-memory
        // database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        schema::bootstrap_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Append a new checkpoint record for the thread.
    ///
    /// `node` labels the step that produced the state; `interrupt` carries
    /// the confirmation prompt when the step suspended.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn save(
        &self,
        thread: &ThreadHandle,
        node: &str,
        state: &ConversationState,
        interrupt: Option<&str>,
    ) -> Result<()> {
        let encoded = serde_json::to_string(state)
            .map_err(|err| AppError::Db(format!("failed to encode state: {err}")))?;

        let next_seq: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) + 1 FROM checkpoint WHERE thread_id = ?")
                .bind(thread.as_str())
                .fetch_one(&self.pool)
                .await?;

        sqlx::query(
            "INSERT INTO checkpoint (id, thread_id, seq, node, state, interrupt_prompt, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(thread.as_str())
        .bind(next_seq)
        .bind(node)
        .bind(encoded)
        .bind(interrupt)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The latest persisted state for the thread, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or the stored state cannot
    /// be decoded.
    pub async fn load_latest(&self, thread: &ThreadHandle) -> Result<Option<ConversationState>> {
        let row = sqlx::query(
            "SELECT state FROM checkpoint WHERE thread_id = ? ORDER BY seq DESC LIMIT 1",
        )
        .bind(thread.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let encoded: String = row.get("state");
            serde_json::from_str(&encoded)
                .map_err(|err| AppError::Db(format!("failed to decode state: {err}")))
        })
        .transpose()
    }

    /// The pending confirmation prompt for the thread, derived from the
    /// latest record rather than a mutable flag: pending iff the most recent
    /// step suspended.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn pending_interrupt(&self, thread: &ThreadHandle) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT interrupt_prompt FROM checkpoint WHERE thread_id = ? ORDER BY seq DESC LIMIT 1",
        )
        .bind(thread.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| row.get::<Option<String>, _>("interrupt_prompt")))
    }

    /// All records for the thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or a stored state cannot be
    /// decoded.
    pub async fn history(&self, thread: &ThreadHandle) -> Result<Vec<CheckpointRecord>> {
        let rows = sqlx::query(
            "SELECT id, thread_id, seq, node, state, interrupt_prompt, created_at \
             FROM checkpoint WHERE thread_id = ? ORDER BY seq ASC",
        )
        .bind(thread.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let encoded: String = row.get("state");
                let state = serde_json::from_str(&encoded)
                    .map_err(|err| AppError::Db(format!("failed to decode state: {err}")))?;
                let created_raw: String = row.get("created_at");
                let created_at = DateTime::parse_from_rfc3339(&created_raw)
                    .map_err(|err| AppError::Db(format!("invalid created_at: {err}")))?
                    .with_timezone(&Utc);

                Ok(CheckpointRecord {
                    id: row.get("id"),
                    thread_id: row.get("thread_id"),
                    seq: row.get("seq"),
                    node: row.get("node"),
                    state,
                    interrupt_prompt: row.get("interrupt_prompt"),
                    created_at,
                })
            })
            .collect()
    }
}
