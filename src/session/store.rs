//! In-memory holder of a client session's current access token.

use std::sync::Arc;

use tokio::sync::watch;

/// The access token of one client session. Never persisted.
///
/// Clones share the same slot; subscribers are woken on every change.
#[derive(Debug, Clone)]
pub struct TokenStore {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the stored token.
    pub fn set(&self, token: impl Into<String>) {
        self.tx.send_replace(Some(token.into()));
    }

    pub fn get(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// Watch the token for changes (refreshes, logout).
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
