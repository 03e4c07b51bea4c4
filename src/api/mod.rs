mod auth;
mod config;
mod error;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::auth::ServerSettings;
use crate::rate_limit::RateLimitConfig;
use crate::upstream::UpstreamClient;

pub use config::PublicConfig;
pub use error::{ApiError, Envelope, FieldErrors};

/// Create the API router.
pub fn create_api_router(
    upstream: UpstreamClient,
    settings: Arc<ServerSettings>,
    rate_limit_config: Arc<RateLimitConfig>,
    public: Arc<PublicConfig>,
) -> Router {
    let auth_state = auth::AuthState {
        upstream: upstream.clone(),
        settings,
        rate_limit_config: rate_limit_config.clone(),
    };

    let users_state = users::UsersState {
        upstream,
        rate_limit_config,
    };

    let config_state = config::ConfigState { public };

    Router::new()
        .merge(auth::router(auth_state))
        .nest("/users", users::router(users_state))
        .nest("/config", config::router(config_state))
}
