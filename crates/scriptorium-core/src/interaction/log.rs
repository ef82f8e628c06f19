//! InteractionLog trait definition.
//!
//! Follows the same RPITIT pattern as `LlmProvider`.

use chrono::{DateTime, Utc};
use scriptorium_types::error::RepositoryError;
use scriptorium_types::interaction::InteractionRecord;
use uuid::Uuid;

/// Append-only store of interaction records keyed by session id.
///
/// Records are never updated. Durable backends never delete; process-local
/// backends drop whole idle sessions through [`InteractionLog::expire_idle`].
pub trait InteractionLog: Send + Sync {
    /// Append a record, assigning it the next sequence number for its
    /// session. Returns the stored record.
    fn append(
        &self,
        record: InteractionRecord,
    ) -> impl std::future::Future<Output = Result<InteractionRecord, RepositoryError>> + Send;

    /// All records for a session ordered by sequence.
    fn list(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<InteractionRecord>, RepositoryError>> + Send;

    /// Release sessions whose newest record is not after `cutoff`.
    /// Returns how many sessions were released.
    fn expire_idle(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<usize, RepositoryError>> + Send;
}
