//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to re-run
//! on every startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS checkpoint (
    id               TEXT PRIMARY KEY NOT NULL,
    thread_id        TEXT NOT NULL,
    seq              INTEGER NOT NULL,
    node             TEXT NOT NULL,
    state            TEXT NOT NULL,
    interrupt_prompt TEXT,
    created_at       TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_checkpoint_thread_seq
    ON checkpoint(thread_id, seq);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
