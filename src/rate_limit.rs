//! Rate limiting for authentication endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down credential
//! stuffing against the backend and signup spam.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{
    num::NonZeroU32,
    sync::{Arc, Weak},
    time::Duration,
};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::auth::{IpSource, extract_client_ip};

/// Interval between sweeps of idle client entries.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Quotas for the limited endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    /// Sustained login attempts per second per IP
    pub login_per_second: NonZeroU32,
    /// Login attempts allowed in a burst per IP
    pub login_burst: NonZeroU32,
    /// Registrations per minute per IP
    pub register_per_minute: NonZeroU32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login_per_second: NonZeroU32::MIN,
            login_burst: NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN),
            register_per_minute: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for login endpoints (default 1/s, burst 5)
    pub login: Arc<IpLimiter>,
    /// Per-IP limiter for registration (default 3/min)
    pub register: Arc<IpLimiter>,
    /// Where the client IP is read from
    pub ip_source: IpSource,
}

impl RateLimitConfig {
    pub fn new(limits: RateLimits, ip_source: IpSource) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(
                Quota::per_second(limits.login_per_second).allow_burst(limits.login_burst),
            )),
            register: Arc::new(RateLimiter::keyed(Quota::per_minute(
                limits.register_per_minute,
            ))),
            ip_source,
        }
    }
}

/// Drop limiter entries for clients whose quota has fully replenished.
pub fn prune_idle_clients(config: &RateLimitConfig) {
    config.login.retain_recent();
    config.login.shrink_to_fit();
    config.register.retain_recent();
    config.register.shrink_to_fit();
    debug!(
        login = config.login.len(),
        register = config.register.len(),
        "Pruned rate limiter entries"
    );
}

/// Spawn a background task that prunes the limiters periodically.
/// The task ends once the last router holding `config` is dropped.
pub fn spawn_limiter_cleanup(config: &Arc<RateLimitConfig>) -> tokio::task::JoinHandle<()> {
    let config: Weak<RateLimitConfig> = Arc::downgrade(config);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        interval.tick().await;

        loop {
            interval.tick().await;
            let Some(config) = config.upgrade() else {
                return;
            };
            prune_idle_clients(&config);
        }
    })
}

async fn check_limit(
    limiter: &IpLimiter,
    ip_source: IpSource,
    request: Request,
    next: Next,
    message: &'static str,
) -> Response {
    let ip = match extract_client_ip(&request, ip_source) {
        Ok(ip) => ip,
        Err(reason) => {
            warn!(reason = %reason, "Refusing request without a client IP");
            return ApiError::forbidden("Unable to determine client IP.").into_response();
        }
    };

    match limiter.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::too_many_requests(message).into_response()
        }
    }
}

/// Middleware for rate limiting login endpoints.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check_limit(
        &config.login,
        config.ip_source,
        request,
        next,
        "Too many login attempts. Please wait before trying again.",
    )
    .await
}

/// Middleware for rate limiting registration.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check_limit(
        &config.register,
        config.ip_source,
        request,
        next,
        "Too many signup attempts. Please wait before trying again.",
    )
    .await
}
