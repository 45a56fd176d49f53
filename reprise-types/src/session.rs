//! Session-scoped reasoning state and the store protocol.

use crate::error::SessionError;
use crate::id::SessionId;
use crate::reasoning::ReasoningState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reasoning bookkeeping that outlives a single turn.
///
/// Only the engine mutates it, once per completed physical request, while
/// holding the session's [`SessionGuard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingState {
    /// Owning session.
    pub session_id: SessionId,
    /// Model the state was produced by.
    pub model_id: String,
    /// Latest provider continuation state.
    pub reasoning_state: Option<ReasoningState>,
    /// Reasoning tokens across all turns of the session.
    pub total_thinking_tokens: u64,
    /// Answer tokens across all turns of the session.
    pub total_output_tokens: u64,
    /// Continuation requests across all turns of the session.
    pub continuation_count: u64,
    /// First write.
    pub created_at: DateTime<Utc>,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}

impl ThinkingState {
    /// Fresh state for a session.
    pub fn new(session_id: SessionId, model_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            model_id: model_id.into(),
            reasoning_state: None,
            total_thinking_tokens: 0,
            total_output_tokens: 0,
            continuation_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold one physical request into the running totals.
    ///
    /// A round without state keeps the previous state.
    pub fn record_round(
        &mut self,
        reasoning_state: Option<&ReasoningState>,
        thinking_tokens: u64,
        output_tokens: u64,
        was_continuation: bool,
    ) {
        if let Some(state) = reasoning_state {
            self.reasoning_state = Some(state.clone());
        }
        self.total_thinking_tokens = self.total_thinking_tokens.saturating_add(thinking_tokens);
        self.total_output_tokens = self.total_output_tokens.saturating_add(output_tokens);
        if was_continuation {
            self.continuation_count += 1;
        }
        self.updated_at = Utc::now();
    }
}

/// Proof of exclusive access to one session.
///
/// Dropping the guard releases the session. Stores put whatever lock
/// handle they use inside it.
pub struct SessionGuard {
    session: SessionId,
    _lock: Box<dyn Send + Sync>,
}

impl SessionGuard {
    /// Wrap a store-specific lock handle.
    pub fn new(session: SessionId, lock: impl Send + Sync + 'static) -> Self {
        Self {
            session,
            _lock: Box::new(lock),
        }
    }

    /// Session this guard covers.
    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Persistence for [`ThinkingState`] snapshots, keyed by session.
///
/// Implementations must make [`lock`](SessionStore::lock) and
/// [`try_lock`](SessionStore::try_lock) mutually exclusive per session:
/// at most one live [`SessionGuard`] per session id at any time.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the latest snapshot. `None` if the session has none yet.
    async fn load(&self, session: &SessionId) -> Result<Option<ThinkingState>, SessionError>;

    /// Write a snapshot, replacing any previous one.
    async fn save(&self, state: &ThinkingState) -> Result<(), SessionError>;

    /// Acquire the session, waiting for any current holder to release it.
    async fn lock(&self, session: &SessionId) -> Result<SessionGuard, SessionError>;

    /// Acquire the session or fail with [`SessionError::Busy`].
    async fn try_lock(&self, session: &SessionId) -> Result<SessionGuard, SessionError>;
}
