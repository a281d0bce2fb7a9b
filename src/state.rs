//! Shared application state.
//!
//! Contains everything a page or command needs: configuration, the session
//! store, the backend client, navigation and route policies.

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::guard::{RouteGuard, RoutePolicy};
use crate::navigation::Navigator;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state handed to every consumer of the session.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Sole owner of the session token.
    pub store: Arc<SessionStore>,
    /// Backend client that authenticates with the store's token.
    pub api: Arc<ApiClient>,
    /// Where redirects go.
    pub navigator: Arc<dyn Navigator>,
    /// Role restrictions per path prefix.
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    /// A guard for `path` configured from the navigation section and route policies.
    pub fn guard_for(&self, path: &str) -> RouteGuard {
        RouteGuard::for_path(
            self.store.clone(),
            self.navigator.clone(),
            &self.config.navigation,
            &self.policy,
            path,
        )
    }
}
