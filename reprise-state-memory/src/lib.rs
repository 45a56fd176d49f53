#![deny(missing_docs)]
//! In-memory implementation of reprise's [`SessionStore`] trait.
//!
//! Snapshots are kept as JSON values in a `HashMap` behind a `RwLock`, so
//! [`export`](MemorySessionStore::export) and
//! [`import`](MemorySessionStore::import) move them in and out of the
//! process unchanged. Exclusivity is one async mutex per session; a
//! [`SessionGuard`] owns the mutex guard until it is dropped.

use async_trait::async_trait;
use reprise_types::{SessionError, SessionGuard, SessionId, SessionStore, ThinkingState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory session store.
///
/// Suitable for tests and single-process deployments where reasoning state
/// need not survive a restart.
pub struct MemorySessionStore {
    snapshots: RwLock<HashMap<SessionId, serde_json::Value>>,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl MemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ids of every session with a snapshot, sorted.
    pub async fn sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.snapshots.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop a session's snapshot. Returns whether one existed.
    ///
    /// The session's mutex is dropped too unless a guard or a waiter still
    /// holds it.
    pub async fn remove(&self, session: &SessionId) -> bool {
        let removed = self.snapshots.write().await.remove(session).is_some();
        let mut locks = self.locks.lock().await;
        if locks.get(session).is_some_and(|m| Arc::strong_count(m) == 1) {
            locks.remove(session);
        }
        removed
    }

    /// The raw snapshot for `session`.
    pub async fn export(&self, session: &SessionId) -> Option<serde_json::Value> {
        self.snapshots.read().await.get(session).cloned()
    }

    /// Install a raw snapshot for `session`. It is only decoded on the next
    /// [`load`](SessionStore::load).
    pub async fn import(&self, session: SessionId, snapshot: serde_json::Value) {
        self.snapshots.write().await.insert(session, snapshot);
    }

    async fn mutex_for(&self, session: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(session.clone()).or_default())
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session: &SessionId) -> Result<Option<ThinkingState>, SessionError> {
        let Some(snapshot) = self.export(session).await else {
            return Ok(None);
        };
        serde_json::from_value(snapshot)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                session: session.clone(),
                message: e.to_string(),
            })
    }

    async fn save(&self, state: &ThinkingState) -> Result<(), SessionError> {
        let snapshot =
            serde_json::to_value(state).map_err(|e| SessionError::Store(e.to_string()))?;
        self.snapshots
            .write()
            .await
            .insert(state.session_id.clone(), snapshot);
        Ok(())
    }

    async fn lock(&self, session: &SessionId) -> Result<SessionGuard, SessionError> {
        let guard = self.mutex_for(session).await.lock_owned().await;
        Ok(SessionGuard::new(session.clone(), guard))
    }

    async fn try_lock(&self, session: &SessionId) -> Result<SessionGuard, SessionError> {
        let guard = self
            .mutex_for(session)
            .await
            .try_lock_owned()
            .map_err(|_| SessionError::Busy(session.clone()))?;
        Ok(SessionGuard::new(session.clone(), guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn distinct_sessions_lock_independently() {
        let store = MemorySessionStore::new();
        let _a = store.try_lock(&SessionId::new("a")).await.unwrap();
        let b = store.try_lock(&SessionId::new("b")).await.unwrap();
        assert_eq!(b.session().as_str(), "b");
    }

    #[tokio::test]
    async fn remove_drops_idle_mutex() {
        let store = MemorySessionStore::new();
        let id = SessionId::new("s1");
        drop(store.lock(&id).await.unwrap());
        assert_eq!(store.locks.lock().await.len(), 1);

        assert!(!store.remove(&id).await);
        assert!(store.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn remove_keeps_held_mutex() {
        let store = MemorySessionStore::new();
        let id = SessionId::new("s1");
        let guard = store.lock(&id).await.unwrap();

        store.remove(&id).await;
        assert!(matches!(store.try_lock(&id).await, Err(SessionError::Busy(_))));

        drop(guard);
        store.remove(&id).await;
        assert!(store.locks.lock().await.is_empty());
    }
}
