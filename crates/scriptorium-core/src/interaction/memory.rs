//! In-process interaction log.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use scriptorium_types::error::RepositoryError;
use scriptorium_types::interaction::InteractionRecord;
use uuid::Uuid;

use super::log::InteractionLog;

/// Interaction log held in memory. Sessions stay until they go idle and
/// [`InteractionLog::expire_idle`] releases them.
#[derive(Default)]
pub struct MemoryInteractionLog {
    records: DashMap<Uuid, Vec<InteractionRecord>>,
}

impl MemoryInteractionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionLog for MemoryInteractionLog {
    async fn append(&self, mut record: InteractionRecord) -> Result<InteractionRecord, RepositoryError> {
        // The entry guard serializes appends for one session.
        let mut entries = self.records.entry(record.session_id).or_default();
        record.sequence = entries.len() as u32;
        entries.push(record.clone());
        Ok(record)
    }

    async fn list(&self, session_id: &Uuid) -> Result<Vec<InteractionRecord>, RepositoryError> {
        Ok(self
            .records
            .get(session_id)
            .map(|entries| entries.clone())
            .unwrap_or_default())
    }

    async fn expire_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut expired = 0;
        self.records.retain(|_, entries| {
            let keep = entries.last().is_some_and(|newest| newest.recorded_at > cutoff);
            if !keep {
                expired += 1;
            }
            keep
        });
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::box_log::BoxInteractionLog;
    use scriptorium_types::interaction::InteractionKind;

    fn record(session_id: Uuid, kind: InteractionKind) -> InteractionRecord {
        InteractionRecord::new(session_id, kind, "prompt", "response", "model")
    }

    #[tokio::test]
    async fn test_sequences_are_contiguous_per_session() {
        let log = MemoryInteractionLog::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let first = log.append(record(a, InteractionKind::Plan)).await.unwrap();
        let other = log.append(record(b, InteractionKind::Analysts)).await.unwrap();
        let second = log.append(record(a, InteractionKind::Draft)).await.unwrap();

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(other.sequence, 0);
        assert_eq!(log.list(&a).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_returns_in_append_order() {
        let log = MemoryInteractionLog::new();
        let id = Uuid::now_v7();
        for kind in [InteractionKind::Plan, InteractionKind::Draft, InteractionKind::Critique] {
            log.append(record(id, kind)).await.unwrap();
        }
        let kinds: Vec<InteractionKind> = log.list(&id).await.unwrap().into_iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![InteractionKind::Plan, InteractionKind::Draft, InteractionKind::Critique]
        );
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let log = BoxInteractionLog::new(MemoryInteractionLog::new());
        let id = Uuid::now_v7();
        assert!(log.list(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expire_idle_releases_stale_sessions() {
        let log = BoxInteractionLog::new(MemoryInteractionLog::new());
        let stale = Uuid::now_v7();
        let fresh = Uuid::now_v7();

        let mut old = record(stale, InteractionKind::Plan);
        old.recorded_at = Utc::now() - chrono::Duration::hours(2);
        log.append(old).await.unwrap();
        log.append(record(fresh, InteractionKind::Plan)).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(log.expire_idle(cutoff).await.unwrap(), 1);
        assert!(log.list(&stale).await.unwrap().is_empty());
        assert_eq!(log.list(&fresh).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_restarts_sequence() {
        let log = MemoryInteractionLog::new();
        let id = Uuid::now_v7();
        log.append(record(id, InteractionKind::Plan)).await.unwrap();

        log.expire_idle(Utc::now() + chrono::Duration::seconds(1)).await.unwrap();
        let again = log.append(record(id, InteractionKind::Draft)).await.unwrap();
        assert_eq!(again.sequence, 0);
    }
}
