use std::fmt;

use serde::Serialize;

use crate::models::Identity;

/// What the rest of the application sees of the session.
///
/// While `loading` is true neither `token` nor `user` is authoritative.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    /// The state of a store that has not finished its boot check.
    pub fn booting() -> Self {
        Self {
            token: None,
            user: None,
            loading: true,
        }
    }

    pub(crate) fn signed_out(loading: bool) -> Self {
        Self {
            token: None,
            user: None,
            loading,
        }
    }

    pub(crate) fn signed_in(token: String, user: Identity, loading: bool) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            loading,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }
}

// Keep raw tokens out of logs.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("loading", &self.loading)
            .finish()
    }
}
