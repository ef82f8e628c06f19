//! SQLite interaction log implementation.
//!
//! Implements `InteractionLog` from `scriptorium-core`. Sequence numbers are
//! assigned inside a write transaction on the single-connection writer pool,
//! so they stay contiguous per session under concurrent appends.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use scriptorium_core::interaction::log::InteractionLog;
use scriptorium_types::error::RepositoryError;
use scriptorium_types::interaction::{InteractionKind, InteractionRecord};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `InteractionLog`.
pub struct SqliteInteractionLog {
    pool: DatabasePool,
}

impl SqliteInteractionLog {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to `InteractionRecord`.
struct InteractionRow {
    id: String,
    session_id: String,
    sequence: i64,
    kind: String,
    prompt: String,
    response: String,
    model: String,
    recorded_at: String,
}

impl InteractionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            sequence: row.try_get("sequence")?,
            kind: row.try_get("kind")?,
            prompt: row.try_get("prompt")?,
            response: row.try_get("response")?,
            model: row.try_get("model")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }

    fn into_record(self) -> Result<InteractionRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid interaction id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let kind: InteractionKind = self.kind.parse().map_err(RepositoryError::Query)?;
        let sequence = u32::try_from(self.sequence)
            .map_err(|e| RepositoryError::Query(format!("invalid sequence: {e}")))?;

        Ok(InteractionRecord {
            id,
            session_id,
            sequence,
            kind,
            prompt: self.prompt,
            response: self.response,
            model: self.model,
            recorded_at: parse_datetime(&self.recorded_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

const NEXT_SEQUENCE_SQL: &str =
    "SELECT COALESCE(MAX(sequence) + 1, 0) AS next FROM interactions WHERE session_id = ?";

impl InteractionLog for SqliteInteractionLog {
    async fn append(&self, mut record: InteractionRecord) -> Result<InteractionRecord, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let next: i64 = sqlx::query(NEXT_SEQUENCE_SQL)
            .bind(record.session_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error)?
            .try_get("next")
            .map_err(query_error)?;
        record.sequence = u32::try_from(next)
            .map_err(|e| RepositoryError::Query(format!("invalid sequence: {e}")))?;

        sqlx::query(
            r#"INSERT INTO interactions (id, session_id, sequence, kind, prompt, response, model, recorded_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.session_id.to_string())
        .bind(next)
        .bind(record.kind.to_string())
        .bind(&record.prompt)
        .bind(&record.response)
        .bind(&record.model)
        .bind(record.recorded_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(record)
    }

    async fn list(&self, session_id: &Uuid) -> Result<Vec<InteractionRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM interactions WHERE session_id = ? ORDER BY sequence ASC")
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let interaction = InteractionRow::from_row(row).map_err(query_error)?;
            records.push(interaction.into_record()?);
        }
        Ok(records)
    }

    /// The audit table is durable; idle sessions keep their records.
    async fn expire_idle(&self, _cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        Ok(0)
    }
}
