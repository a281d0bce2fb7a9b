use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::codec::TokenDecoder;
use super::error::SessionError;
use super::state::SessionState;
use crate::config::types::default_login_path;
use crate::config::ConfigV1;
use crate::models::Identity;
use crate::navigation::Navigator;
use crate::storage::TokenSlot;

/// Knobs for a [`SessionStore`].
#[derive(Clone)]
pub struct SessionOptions {
    pub decoder: TokenDecoder,
    pub login_path: String,
    /// Spawn a one-shot logout timer for every accepted token with an `exp`.
    pub expiry_timer: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            decoder: TokenDecoder::unverified(),
            login_path: default_login_path(),
            expiry_timer: true,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &ConfigV1) -> Self {
        Self {
            decoder: TokenDecoder::from_config(&config.session),
            login_path: config.navigation.login_path.clone(),
            expiry_timer: config.session.expiry_timer,
        }
    }
}

/// The single owner of the bearer token and the identity derived from it.
///
/// Every change is published on a `watch` channel; see [`SessionStore::subscribe`].
/// Dropping the store cancels its expiry timer.
pub struct SessionStore {
    shared: Arc<Shared>,
}

struct Shared {
    slot: Arc<dyn TokenSlot>,
    navigator: Arc<dyn Navigator>,
    options: SessionOptions,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
}

#[derive(Default)]
struct Inner {
    initialized: bool,
    /// Bumped whenever the live token changes, so a stale timer can tell it lost.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl SessionStore {
    pub fn new(
        slot: Arc<dyn TokenSlot>,
        navigator: Arc<dyn Navigator>,
        options: SessionOptions,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::booting());
        Self {
            shared: Arc::new(Shared {
                slot,
                navigator,
                options,
                inner: Mutex::new(Inner::default()),
                state_tx,
            }),
        }
    }

    /// Runs the boot check: reads the persisted token and validates it.
    ///
    /// Always leaves `loading` false. Only the first call does anything.
    pub fn initialize(&self) -> SessionState {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if inner.initialized {
            warn!("Session store already initialized; ignoring repeated initialize()");
            return shared.snapshot();
        }
        inner.initialized = true;

        let stored = match shared.slot.read() {
            Ok(stored) => stored,
            Err(e) => {
                let err = SessionError::from(e);
                warn!(
                    event_name = "session.restore.failed",
                    event_domain = "session",
                    reason = err.kind(),
                    "Could not read persisted token: {}",
                    err
                );
                None
            }
        };

        let next = match stored {
            None => {
                debug!("No persisted token; starting signed out");
                shared.clear(&mut inner, false)
            }
            Some(token) => shared.admit(&mut inner, token, false),
        };

        info!(
            event_name = "session.initialized",
            event_domain = "session",
            authenticated = next.user.is_some(),
            "session store initialized"
        );
        shared.publish(next)
    }

    /// Installs a new token, or clears the session when given `None`.
    ///
    /// A token that does not decode, has already expired, or cannot be
    /// persisted clears the session exactly as `None` would.
    pub fn set_token(&self, token: Option<String>) -> SessionState {
        let shared = &self.shared;
        let mut inner = shared.lock();
        let loading = shared.state_tx.borrow().loading;

        let next = match token {
            Some(token) => match shared.slot.write(&token) {
                Ok(()) => shared.admit(&mut inner, token, loading),
                Err(e) => {
                    let err = SessionError::from(e);
                    warn!(
                        event_name = "session.persist.failed",
                        event_domain = "session",
                        reason = err.kind(),
                        "Could not persist token; discarding it: {}",
                        err
                    );
                    shared.clear(&mut inner, loading)
                }
            },
            None => shared.clear(&mut inner, loading),
        };
        shared.publish(next)
    }

    /// Clears the session and navigates to the login path. Safe to call at any time.
    pub fn logout(&self) {
        let was_signed_in = self.shared.state_tx.borrow().user.is_some();
        self.set_token(None);
        if was_signed_in {
            info!(
                event_name = "session.logout",
                event_domain = "session",
                "user logged out"
            );
        }
        self.shared.navigator.navigate(&self.shared.options.login_path);
    }

    /// A copy of the current state.
    pub fn state(&self) -> SessionState {
        self.shared.snapshot()
    }

    /// Receives every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.shared.state_tx.borrow().token.clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.shared.state_tx.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state_tx.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.state_tx.borrow().is_authenticated()
    }

    pub fn login_path(&self) -> &str {
        &self.shared.options.login_path
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    fn publish(&self, next: SessionState) -> SessionState {
        self.state_tx.send_replace(next.clone());
        next
    }

    /// Validates `token` and makes it live, or clears the session if it is unusable.
    fn admit(self: &Arc<Self>, inner: &mut Inner, token: String, loading: bool) -> SessionState {
        match self.options.decoder.validate(&token, Utc::now()) {
            Ok(claims) => {
                let identity = Identity::from(claims);
                inner.generation += 1;
                self.schedule_expiry(inner, identity.expires_at);
                debug!(
                    event_name = "session.token.accepted",
                    event_domain = "session",
                    username = identity.username.as_str(),
                    "token accepted"
                );
                SessionState::signed_in(token, identity, loading)
            }
            Err(e) => {
                warn!(
                    event_name = "session.token.rejected",
                    event_domain = "session",
                    reason = e.kind(),
                    "Discarding token: {}",
                    e
                );
                self.clear(inner, loading)
            }
        }
    }

    fn clear(&self, inner: &mut Inner, loading: bool) -> SessionState {
        inner.generation += 1;
        inner.cancel_timer();
        if let Err(e) = self.slot.clear() {
            debug!("Could not clear persisted token: {}", SessionError::from(e));
        }
        SessionState::signed_out(loading)
    }

    fn schedule_expiry(self: &Arc<Self>, inner: &mut Inner, expires_at: Option<DateTime<Utc>>) {
        inner.cancel_timer();
        if !self.options.expiry_timer {
            return;
        }
        let Some(expires_at) = expires_at else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available; session expiry timer not scheduled");
            return;
        };

        let ttl = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let generation = inner.generation;
        let weak: Weak<Shared> = Arc::downgrade(self);
        debug!(ttl_seconds = ttl.as_secs(), "scheduling session expiry");
        inner.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(shared) = weak.upgrade() {
                shared.expire(generation);
            }
        }));
    }

    /// Timer callback: logs the session out if `generation` is still live.
    fn expire(&self, generation: u64) {
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!("Expiry timer fired for a replaced token; ignoring");
                return;
            }
            // We are running inside this timer; drop the handle instead of aborting ourselves.
            inner.timer.take();
            let loading = self.state_tx.borrow().loading;
            let next = self.clear(&mut inner, loading);
            self.publish(next);
        }
        info!(
            event_name = "session.expired",
            event_domain = "session",
            "session token expired; logging out"
        );
        self.navigator.navigate(&self.options.login_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::storage::{MemorySlot, NoSlot};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn mint(exp_offset: i64) -> String {
        let claims = json!({
            "sub": "QC12345",
            "role": "chemist",
            "full_name": "Jane Doe",
            "department": "QC",
            "exp": Utc::now().timestamp() + exp_offset,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"supersecretkey"),
        )
        .expect("Failed to create token")
    }

    fn store_with(slot: Arc<dyn TokenSlot>) -> (SessionStore, Arc<HistoryNavigator>) {
        let nav = Arc::new(HistoryNavigator::new());
        let store = SessionStore::new(slot, nav.clone(), SessionOptions::default());
        (store, nav)
    }

    #[test]
    fn starts_loading_until_initialized() {
        let (store, _) = store_with(Arc::new(MemorySlot::new()));
        assert!(store.is_loading());
        let state = store.initialize();
        assert!(!state.loading);
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
    }

    #[test]
    fn second_initialize_is_ignored() {
        let slot = Arc::new(MemorySlot::new());
        let (store, _) = store_with(slot.clone());
        store.initialize();
        slot.write(&mint(3600)).unwrap();
        let state = store.initialize();
        assert!(!state.loading);
        assert_eq!(state.user, None);
    }

    #[test]
    fn restores_valid_token_without_runtime() {
        let token = mint(3600);
        let (store, _) = store_with(Arc::new(MemorySlot::with_token(token.clone())));
        let state = store.initialize();

        assert!(state.is_authenticated());
        assert_eq!(state.token.as_deref(), Some(token.as_str()));
        assert_eq!(state.user.unwrap().username, "QC12345");
    }

    #[test]
    fn expired_persisted_token_is_cleared() {
        let slot = Arc::new(MemorySlot::with_token(mint(-10)));
        let (store, _) = store_with(slot.clone());
        let state = store.initialize();

        assert!(!state.loading);
        assert_eq!(state.user, None);
        assert_eq!(slot.read().unwrap(), None);
    }

    #[test]
    fn unavailable_persistence_means_signed_out() {
        let (store, _) = store_with(Arc::new(NoSlot::new()));
        let state = store.initialize();
        assert!(!state.loading);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn failed_persistence_discards_token() {
        let (store, nav) = store_with(Arc::new(NoSlot::new()));
        store.initialize();

        let state = store.set_token(Some(mint(3600)));
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
        assert!(!store.is_authenticated());
        assert_eq!(nav.count(), 0);
    }

    #[test]
    fn malformed_token_matches_clearing() {
        let slot = Arc::new(MemorySlot::new());
        let (store, nav) = store_with(slot.clone());
        store.initialize();
        store.set_token(Some(mint(3600)));

        let malformed = store.set_token(Some("garbage".to_string()));
        let cleared = store.set_token(None);

        assert_eq!(malformed, cleared);
        assert_eq!(slot.read().unwrap(), None);
        assert_eq!(nav.count(), 0);
    }

    #[test]
    fn set_token_before_initialize_keeps_loading() {
        let (store, _) = store_with(Arc::new(MemorySlot::new()));
        let state = store.set_token(Some(mint(3600)));
        assert!(state.loading);
        assert!(!state.is_authenticated());
        assert!(store.initialize().is_authenticated());
    }

    #[test]
    fn logout_is_idempotent_and_navigates_each_time() {
        let (store, nav) = store_with(Arc::new(MemorySlot::with_token(mint(3600))));
        store.initialize();

        store.logout();
        let first = store.state();
        store.logout();
        let second = store.state();

        assert_eq!(first, second);
        assert_eq!(first.user, None);
        assert_eq!(nav.history(), vec!["/login", "/login"]);
    }

    #[test]
    fn subscribers_see_changes() {
        let (store, _) = store_with(Arc::new(MemorySlot::new()));
        let mut rx = store.subscribe();
        store.initialize();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().loading);

        store.set_token(Some(mint(3600)));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_timer_logs_out() {
        let (store, nav) = store_with(Arc::new(MemorySlot::with_token(mint(3600))));
        assert!(store.initialize().is_authenticated());

        tokio::time::sleep(Duration::from_secs(3601)).await;

        let state = store.state();
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
        assert!(!state.loading);
        assert_eq!(nav.history(), vec!["/login"]);
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_token_outlives_old_timer() {
        let (store, nav) = store_with(Arc::new(MemorySlot::new()));
        store.initialize();
        store.set_token(Some(mint(60)));
        store.set_token(Some(mint(7200)));

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(store.is_authenticated());
        assert_eq!(nav.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_slot_at_boot_cancels_early_timer() {
        let slot = Arc::new(MemorySlot::new());
        let (store, nav) = store_with(slot.clone());
        store.set_token(Some(mint(60)));
        slot.clear().unwrap();

        let state = store.initialize();
        assert!(!state.is_authenticated());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(nav.count(), 0);
        assert_eq!(store.state(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_cancels_timer() {
        let (store, nav) = store_with(Arc::new(MemorySlot::new()));
        store.initialize();
        store.set_token(Some(mint(60)));
        store.logout();

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(nav.history(), vec!["/login"]);
    }
}
