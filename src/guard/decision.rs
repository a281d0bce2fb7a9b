use serde::Serialize;

use crate::models::Role;
use crate::session::SessionState;

/// What a guard concluded for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    /// The session is still resolving.
    Pending,
    Authorized,
    UnauthorizedNoSession,
    UnauthorizedWrongRole,
}

impl GuardDecision {
    /// Whether this decision sends the user elsewhere.
    pub fn is_redirect(self) -> bool {
        matches!(
            self,
            GuardDecision::UnauthorizedNoSession | GuardDecision::UnauthorizedWrongRole
        )
    }
}

/// Decides whether guarded content may render.
///
/// `loading` always wins, so a session that is still being restored is
/// never mistaken for an absent one. `required_roles` of `None` means any
/// signed-in user passes; an empty set admits nobody.
pub fn evaluate(state: &SessionState, required_roles: Option<&[Role]>) -> GuardDecision {
    if state.loading {
        return GuardDecision::Pending;
    }
    let Some(user) = &state.user else {
        return GuardDecision::UnauthorizedNoSession;
    };
    match required_roles {
        Some(roles) if !user.has_any_role(roles) => GuardDecision::UnauthorizedWrongRole,
        _ => GuardDecision::Authorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    fn state(role: Option<Role>, loading: bool) -> SessionState {
        SessionState {
            token: Some("t".into()),
            user: Some(Identity {
                username: "QC1".into(),
                role,
                full_name: None,
                department: None,
                expires_at: None,
            }),
            loading,
        }
    }

    #[test]
    fn loading_takes_precedence() {
        let loading = state(Some(Role::Chemist), true);
        assert_eq!(evaluate(&loading, Some(&[Role::Admin])), GuardDecision::Pending);

        let empty = SessionState::booting();
        assert_eq!(evaluate(&empty, None), GuardDecision::Pending);
    }

    #[test]
    fn no_identity_means_no_session() {
        let signed_out = SessionState {
            token: None,
            user: None,
            loading: false,
        };
        assert_eq!(
            evaluate(&signed_out, Some(&[Role::Admin])),
            GuardDecision::UnauthorizedNoSession
        );
    }

    #[test]
    fn wrong_role_is_rejected() {
        let chemist = state(Some(Role::Chemist), false);
        assert_eq!(
            evaluate(&chemist, Some(&[Role::Admin])),
            GuardDecision::UnauthorizedWrongRole
        );
        assert_eq!(
            evaluate(&chemist, Some(&[Role::Admin, Role::Chemist])),
            GuardDecision::Authorized
        );
    }

    #[test]
    fn missing_role_fails_any_restriction() {
        let roleless = state(None, false);
        assert_eq!(evaluate(&roleless, None), GuardDecision::Authorized);
        assert_eq!(
            evaluate(&roleless, Some(&[Role::Other])),
            GuardDecision::UnauthorizedWrongRole
        );
    }

    #[test]
    fn empty_role_set_admits_nobody() {
        let admin = state(Some(Role::Admin), false);
        assert_eq!(
            evaluate(&admin, Some(&[])),
            GuardDecision::UnauthorizedWrongRole
        );
    }
}
