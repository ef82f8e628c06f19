//! BoxInteractionLog -- runtime-selected interaction log backend.
//!
//! Same blanket-impl pattern as `BoxLlmProvider`.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use scriptorium_types::error::RepositoryError;
use scriptorium_types::interaction::InteractionRecord;
use uuid::Uuid;

use super::log::InteractionLog;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`InteractionLog`].
pub trait InteractionLogDyn: Send + Sync {
    fn append_boxed(
        &self,
        record: InteractionRecord,
    ) -> BoxFuture<'_, Result<InteractionRecord, RepositoryError>>;

    fn list_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Vec<InteractionRecord>, RepositoryError>>;

    fn expire_idle_boxed(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize, RepositoryError>>;
}

impl<T: InteractionLog> InteractionLogDyn for T {
    fn append_boxed(
        &self,
        record: InteractionRecord,
    ) -> BoxFuture<'_, Result<InteractionRecord, RepositoryError>> {
        Box::pin(self.append(record))
    }

    fn list_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Vec<InteractionRecord>, RepositoryError>> {
        Box::pin(self.list(session_id))
    }

    fn expire_idle_boxed(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize, RepositoryError>> {
        Box::pin(self.expire_idle(cutoff))
    }
}

/// Type-erased interaction log chosen from configuration at startup.
pub struct BoxInteractionLog {
    inner: Box<dyn InteractionLogDyn>,
}

impl BoxInteractionLog {
    pub fn new<T: InteractionLog + 'static>(log: T) -> Self {
        Self { inner: Box::new(log) }
    }

    pub async fn append(
        &self,
        record: InteractionRecord,
    ) -> Result<InteractionRecord, RepositoryError> {
        self.inner.append_boxed(record).await
    }

    pub async fn list(&self, session_id: &Uuid) -> Result<Vec<InteractionRecord>, RepositoryError> {
        self.inner.list_boxed(session_id).await
    }

    pub async fn expire_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        self.inner.expire_idle_boxed(cutoff).await
    }
}
