//! Client-side session state: the token store and its refresh loop.

mod refresh;
mod store;

pub use refresh::{
    MIN_REFRESH_DELAY, REFRESH_LEAD, RefreshHandle, TokenRefresher, refresh_delay, spawn_refresh_loop,
};
pub use store::TokenStore;
