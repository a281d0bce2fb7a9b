//! Application startup.
//!
//! Builds the token slot, the session store and the backend client from
//! configuration, then runs the session's boot check.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::ConfigV1;
use crate::guard::RoutePolicy;
use crate::navigation::Navigator;
use crate::session::{SessionOptions, SessionStore};
use crate::state::AppState;
use crate::storage::create_slot;

/// Wires the application together and initializes the session.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build(config: Arc<ConfigV1>, navigator: Arc<dyn Navigator>) -> Result<AppState, ApiError> {
    let slot = create_slot(&config.storage);
    if !slot.is_enabled() {
        warn!("Token persistence unavailable; sessions end with the process");
    }
    let store = Arc::new(SessionStore::new(
        slot,
        navigator.clone(),
        SessionOptions::from_config(&config),
    ));
    let api = Arc::new(ApiClient::new(&config.api, store.clone())?);
    let policy = Arc::new(RoutePolicy::from_config(&config.routes));
    info!("Loaded {} route policies", config.routes.len());

    store.initialize();

    Ok(AppState {
        config,
        store,
        api,
        navigator,
        policy,
    })
}
