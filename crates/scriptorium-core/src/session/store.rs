//! Concurrent in-memory session store keyed by session id.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use scriptorium_types::error::SessionError;

struct Slot<T> {
    value: T,
    last_access: Instant,
}

impl<T> Slot<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            last_access: Instant::now(),
        }
    }
}

/// Map from session id to session value.
///
/// Reads hand out clones so no shard lock is held while a caller awaits a
/// remote call. Mutations go through [`SessionStore::update`], which holds
/// the shard lock only for the duration of the closure.
///
/// Every read or update refreshes the session's last-access time; sessions
/// left untouched for longer than the idle limit are dropped by
/// [`SessionStore::evict_idle`].
pub struct SessionStore<T> {
    sessions: DashMap<Uuid, Slot<T>>,
}

impl<T: Clone> SessionStore<T> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert or replace the session stored under `id`.
    pub fn insert(&self, id: Uuid, session: T) {
        self.sessions.insert(id, Slot::new(session));
    }

    /// Snapshot of the session.
    pub fn get(&self, id: &Uuid) -> Result<T, SessionError> {
        let mut slot = self.sessions.get_mut(id).ok_or(SessionError::NotFound)?;
        slot.last_access = Instant::now();
        Ok(slot.value.clone())
    }

    /// Apply `f` to the stored session and return its result.
    pub fn update<R>(&self, id: &Uuid, f: impl FnOnce(&mut T) -> R) -> Result<R, SessionError> {
        let mut slot = self.sessions.get_mut(id).ok_or(SessionError::NotFound)?;
        slot.last_access = Instant::now();
        Ok(f(&mut slot.value))
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.sessions.remove(id).map(|(_, slot)| slot.value)
    }

    /// Drop every session not read or updated within `max_idle`.
    /// Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, slot| {
            let keep = slot.last_access.elapsed() < max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<T: Clone> Default for SessionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_snapshot() {
        let store = SessionStore::new();
        let id = Uuid::now_v7();
        store.insert(id, vec![1, 2]);

        let mut snapshot = store.get(&id).unwrap();
        snapshot.push(3);
        assert_eq!(store.get(&id).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = SessionStore::new();
        let id = Uuid::now_v7();
        store.insert(id, String::from("plan"));

        let len = store
            .update(&id, |s| {
                s.push_str(" + draft");
                s.len()
            })
            .unwrap();
        assert_eq!(len, 12);
        assert_eq!(store.get(&id).unwrap(), "plan + draft");
    }

    #[test]
    fn test_missing_session_errors() {
        let store: SessionStore<String> = SessionStore::new();
        let id = Uuid::now_v7();
        assert!(matches!(store.get(&id), Err(SessionError::NotFound)));
        assert!(matches!(store.update(&id, |_| ()), Err(SessionError::NotFound)));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        store.insert(a, 1u32);
        store.insert(b, 10u32);
        store.update(&a, |v| *v += 1).unwrap();
        assert_eq!(store.get(&a).unwrap(), 2);
        assert_eq!(store.get(&b).unwrap(), 10);
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove(&b), Some(10));
        assert!(!store.contains(&b));
        assert!(store.contains(&a));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_evict_idle_drops_untouched_sessions() {
        let store = SessionStore::new();
        for n in 0..50u32 {
            store.insert(Uuid::now_v7(), n);
        }
        assert_eq!(store.evict_idle(Duration::ZERO), 50);
        assert!(store.is_empty());
    }

    #[test]
    fn test_evict_idle_keeps_recent_sessions() {
        let store = SessionStore::new();
        let id = Uuid::now_v7();
        store.insert(id, "draft".to_string());

        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.get(&id).unwrap(), "draft");
    }

    #[test]
    fn test_access_refreshes_idle_clock() {
        let store = SessionStore::new();
        let stale = Uuid::now_v7();
        let fresh = Uuid::now_v7();
        store.insert(stale, 1u32);
        store.insert(fresh, 2u32);

        std::thread::sleep(Duration::from_millis(100));
        store.get(&fresh).unwrap();

        assert_eq!(store.evict_idle(Duration::from_millis(50)), 1);
        assert!(!store.contains(&stale));
        assert!(store.contains(&fresh));
    }
}
