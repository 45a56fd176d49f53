//! Error types.
//!
//! Recoverable truncation, provider refusals and budget exhaustion are not
//! errors: they come back as a [`TurnResult`](crate::TurnResult). These
//! types cover what is left.

use crate::id::SessionId;
use thiserror::Error;

/// Invalid engine or budget configuration. Raised before any request is sent.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A budget field that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroBudget(&'static str),

    /// A turn request carried no messages.
    #[error("turn request has no messages")]
    EmptyConversation,

    /// A tag-delimited format was configured with an empty delimiter.
    #[error("reasoning delimiters must be non-empty (start: {start:?}, end: {end:?})")]
    EmptyDelimiter {
        /// Configured start delimiter.
        start: String,
        /// Configured end delimiter.
        end: String,
    },
}

/// Failure of the external chat transport.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Provider rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Could not parse the provider's response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Transport-level deadline elapsed.
    #[error("transport timed out")]
    Timeout,

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::RateLimited
                | TransportError::RequestFailed(_)
                | TransportError::Timeout
        )
    }
}

/// Session store failures.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// Another turn holds the session and the conflict policy rejects waiting.
    #[error("session {0} is in use by another turn")]
    Busy(SessionId),

    /// The backing store failed.
    #[error("session store failure: {0}")]
    Store(String),

    /// A stored snapshot could not be decoded.
    #[error("corrupt session snapshot for {session}: {message}")]
    Corrupt {
        /// Session whose snapshot is unreadable.
        session: SessionId,
        /// Decoder message.
        message: String,
    },
}

/// Errors returned by the engine instead of a [`TurnResult`](crate::TurnResult).
///
/// All of these fire before the first physical request is issued.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TurnError {
    /// The turn's configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Session tracking failed at turn start.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        assert_eq!(
            TransportError::RequestFailed("timeout".into()).to_string(),
            "request failed: timeout"
        );
        assert_eq!(TransportError::RateLimited.to_string(), "rate limited");
        assert_eq!(
            TransportError::InvalidResponse("bad json".into()).to_string(),
            "invalid response: bad json"
        );
    }

    #[test]
    fn transport_error_retryable() {
        assert!(TransportError::RateLimited.is_retryable());
        assert!(TransportError::Timeout.is_retryable());
        assert!(TransportError::RequestFailed("reset".into()).is_retryable());
        assert!(!TransportError::AuthFailed("bad key".into()).is_retryable());
        assert!(!TransportError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn turn_error_wraps_config_error() {
        let err: TurnError = ConfigError::ZeroBudget("answer_budget").into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: answer_budget must be greater than zero"
        );
    }

    #[test]
    fn busy_session_names_the_session() {
        let err = SessionError::Busy(SessionId::new("s-42"));
        assert_eq!(err.to_string(), "session s-42 is in use by another turn");
    }
}
