//! Background renewal of a client session's access token.
//!
//! One loop per session: sleep until shortly before the stored token expires,
//! ask the refresher for a new one, store it and repeat. A failed refresh is
//! logged and ends the loop; the stale token stays in the store.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::TokenStore;
use crate::claims::access_token_lifetime;

/// How long before expiry a refresh is attempted: 2 minutes
pub const REFRESH_LEAD: Duration = Duration::from_secs(2 * 60);

/// Shortest wait between two refresh attempts: 5 seconds
pub const MIN_REFRESH_DELAY: Duration = Duration::from_secs(5);

/// Delay until the refresh attempt for a token expiring in `expires_in`.
///
/// Normally `REFRESH_LEAD` before expiry. Tokens shorter-lived than that are
/// refreshed at half their lifetime, and never sooner than `MIN_REFRESH_DELAY`.
pub fn refresh_delay(expires_in: Duration) -> Duration {
    expires_in
        .saturating_sub(REFRESH_LEAD)
        .max(expires_in / 2)
        .max(MIN_REFRESH_DELAY)
}

/// Something that can obtain a fresh access token.
pub trait TokenRefresher: Send + Sync + 'static {
    type Error: Display + Send;

    fn refresh_access_token(&self) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Owns a running refresh loop. Dropping the handle stops the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Whether the loop is still scheduled (it stops after a failed refresh).
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start refreshing the token in `store` until a refresh fails or the handle is dropped.
pub fn spawn_refresh_loop<R: TokenRefresher>(refresher: Arc<R>, store: TokenStore) -> RefreshHandle {
    let task = tokio::spawn(async move {
        loop {
            let Some(token) = store.get() else {
                debug!("No access token to refresh, stopping refresh loop");
                return;
            };

            let delay = refresh_delay(access_token_lifetime(&token));
            debug!(delay_secs = delay.as_secs(), "Access token refresh scheduled");
            tokio::time::sleep(delay).await;

            match refresher.refresh_access_token().await {
                Ok(new_token) => {
                    info!("Access token refreshed");
                    store.set(new_token);
                }
                Err(e) => {
                    warn!(error = %e, "Access token refresh failed, keeping current token");
                    return;
                }
            }
        }
    });

    RefreshHandle { task }
}
