//! Navigation side effects.
//!
//! Session and guard logic never move the user themselves; they ask a
//! [`Navigator`] to go somewhere. The CLI records and prints the target,
//! tests assert on the recorded history.

use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Something that can move the user to another path.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// Records every navigation and logs it.
#[derive(Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All paths navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The path of the most recent navigation, if any.
    pub fn current(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        info!(
            event_name = "navigation.redirect",
            event_domain = "navigation",
            path,
            "navigating"
        );
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
