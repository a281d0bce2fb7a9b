use thiserror::Error;

use crate::storage::SlotError;

/// Reasons a token does not yield a session.
///
/// None of these reach the store's callers: every variant collapses to
/// "signed out" and is only logged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token could not be decoded: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),
    #[error("token expired at {expired_at} (unix seconds)")]
    Expired { expired_at: i64 },
    #[error("token persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] SlotError),
}

impl SessionError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Decode(_) => "decode",
            SessionError::Expired { .. } => "expired",
            SessionError::PersistenceUnavailable(_) => "persistence",
        }
    }
}
