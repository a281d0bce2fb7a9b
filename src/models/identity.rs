use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Claims the backend puts in every access token.
///
/// Every field is optional: a missing claim only leaves a gap in the
/// projected identity, whereas a payload that is not a JSON object at all
/// fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub role: Option<Role>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub exp: Option<i64>,
}

/// The decoded, read-only view of who holds the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Option<Role>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Whether the identity carries any of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.as_ref().is_some_and(|r| roles.contains(r))
    }

    /// Name to show in headers and sidebars, falling back to the employee id.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            username: claims.sub.unwrap_or_default(),
            role: claims.role,
            full_name: claims.full_name,
            department: claims.department,
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
        }
    }
}
