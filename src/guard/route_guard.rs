use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::decision::{evaluate, GuardDecision};
use super::policy::RoutePolicy;
use crate::config::types::{default_login_path, default_unauthorized_path};
use crate::config::NavigationConfig;
use crate::models::Role;
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Text shown while the session is still being restored.
pub const LOADING_MESSAGE: &str = "Checking authentication...";

/// Configuration for one guarded subtree.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub required_roles: Option<Vec<Role>>,
    pub login_path: String,
    pub unauthorized_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            required_roles: None,
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
        }
    }
}

impl GuardConfig {
    pub fn from_navigation(navigation: &NavigationConfig) -> Self {
        Self {
            required_roles: None,
            login_path: navigation.login_path.clone(),
            unauthorized_path: navigation.unauthorized_path.clone(),
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.required_roles = Some(roles.into_iter().collect());
        self
    }

    /// Overrides where signed-out users are sent.
    pub fn redirect_to(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    fn target(&self, decision: GuardDecision) -> Option<&str> {
        match decision {
            GuardDecision::UnauthorizedNoSession => Some(&self.login_path),
            GuardDecision::UnauthorizedWrongRole => Some(&self.unauthorized_path),
            GuardDecision::Pending | GuardDecision::Authorized => None,
        }
    }
}

/// What a guarded subtree renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    /// A neutral placeholder; no navigation has happened.
    Loading(&'static str),
    /// The guarded content, unchanged.
    Content(T),
    /// Nothing, so protected content never flashes before a redirect.
    Nothing,
}

/// Gates a subtree behind the session store.
///
/// Rendering is pure. Redirects happen only in [`RouteGuard::react`], and
/// only when the decision changes into a redirect, which keeps repeated
/// evaluations from looping.
pub struct RouteGuard {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    config: Mutex<GuardConfig>,
    last: Mutex<Option<GuardDecision>>,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>, config: GuardConfig) -> Self {
        Self {
            store,
            navigator,
            config: Mutex::new(config),
            last: Mutex::new(None),
        }
    }

    /// A guard for `path` with the roles `policy` requires there.
    pub fn for_path(
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        navigation: &NavigationConfig,
        policy: &RoutePolicy,
        path: &str,
    ) -> Self {
        let mut config = GuardConfig::from_navigation(navigation);
        config.required_roles = policy.required_roles(path).map(<[Role]>::to_vec);
        Self::new(store, navigator, config)
    }

    fn config(&self) -> MutexGuard<'_, GuardConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The decision for the current session state, with no side effects.
    pub fn decision(&self) -> GuardDecision {
        let state = self.store.state();
        evaluate(&state, self.config().required_roles.as_deref())
    }

    /// Renders `content` only when access is authorized.
    pub fn render<T>(&self, content: impl FnOnce() -> T) -> Rendered<T> {
        match self.decision() {
            GuardDecision::Pending => Rendered::Loading(LOADING_MESSAGE),
            GuardDecision::Authorized => Rendered::Content(content()),
            GuardDecision::UnauthorizedNoSession | GuardDecision::UnauthorizedWrongRole => {
                Rendered::Nothing
            }
        }
    }

    /// Re-evaluates and performs the redirect for a newly reached denial.
    pub fn react(&self) -> GuardDecision {
        let (decision, target) = {
            let config = self.config();
            let decision = evaluate(&self.store.state(), config.required_roles.as_deref());
            (decision, config.target(decision).map(str::to_string))
        };

        let previous = self
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(decision);
        if previous == Some(decision) {
            return decision;
        }

        debug!(?previous, ?decision, "guard decision changed");
        if let Some(target) = target {
            info!(
                event_name = "guard.redirect",
                event_domain = "guard",
                decision = ?decision,
                target = target.as_str(),
                "access denied; redirecting"
            );
            self.navigator.navigate(&target);
        }
        decision
    }

    /// Swaps the required roles and re-evaluates.
    pub fn set_required_roles(&self, roles: Option<Vec<Role>>) -> GuardDecision {
        self.config().required_roles = roles;
        self.react()
    }

    /// Reacts to every session change until the store goes away.
    pub async fn watch(&self) {
        let mut rx = self.store.subscribe();
        loop {
            rx.borrow_and_update();
            self.react();
            if rx.changed().await.is_err() {
                debug!("Session store dropped; guard stops watching");
                return;
            }
        }
    }
}
