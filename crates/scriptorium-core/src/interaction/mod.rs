//! Append-only interaction log.
//!
//! Records every remote generation step against the session that triggered
//! it. Implementations exist for process memory (here) and SQLite
//! (scriptorium-infra).

pub mod box_log;
pub mod log;
pub mod memory;

use scriptorium_types::interaction::InteractionRecord;

use self::box_log::BoxInteractionLog;

/// Append `record`, logging instead of failing when the store rejects it.
///
/// A lost log entry must not fail the user-facing action that produced it.
pub async fn record_best_effort(log: &BoxInteractionLog, record: InteractionRecord) {
    let session_id = record.session_id;
    let kind = record.kind;
    if let Err(e) = log.append(record).await {
        tracing::warn!(session_id = %session_id, kind = %kind, error = %e, "failed to append interaction record");
    }
}
