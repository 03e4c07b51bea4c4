pub mod api;
pub mod auth;
pub mod claims;
pub mod cli;
pub mod client;
pub mod pages;
pub mod rate_limit;
pub mod role;
pub mod session;
pub mod upstream;

use api::{PublicConfig, create_api_router};
use auth::{IpSource, LOGIN_PATH, ServerSettings};
use axum::{Router, response::Redirect, routing::get};
use pages::{PagesState, create_pages_router};
use rate_limit::{RateLimitConfig, RateLimits, spawn_limiter_cleanup};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use upstream::{UpstreamClient, UpstreamError};
use url::Url;

pub struct ServerConfig {
    /// Base URL of the backend API (server-side calls)
    pub upstream_url: Url,
    /// URLs and settings exposed to browsers through `/api/config`
    pub public: PublicConfig,
    /// Whether to set Secure flag on cookies (true in production)
    pub secure_cookies: bool,
    /// Where client IPs are read from
    pub ip_source: IpSource,
    /// Quotas for login and registration
    pub rate_limits: RateLimits,
    /// Timeout for each backend call
    pub upstream_timeout: Duration,
    /// Whether to add a random nonce to CSP headers for each HTML response
    pub csp_nonce: bool,
}

/// Errors that prevent the server from starting or keep it from running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to create backend client: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Result<Router, ServerError> {
    let upstream = UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout)?;

    let settings = Arc::new(ServerSettings {
        secure_cookies: config.secure_cookies,
    });
    let rate_limit_config = Arc::new(RateLimitConfig::new(config.rate_limits, config.ip_source));
    if tokio::runtime::Handle::try_current().is_ok() {
        spawn_limiter_cleanup(&rate_limit_config);
    }

    let public = &config.public;
    let pages_state = PagesState::new(
        upstream.clone(),
        &[&public.api_url, &public.ai_agent_url, &public.lead_service_url],
        config.csp_nonce,
    );

    let api_router = create_api_router(
        upstream.clone(),
        settings,
        rate_limit_config,
        Arc::new(public.clone()),
    );

    info!(
        upstream = %config.upstream_url,
        environment = public.environment,
        secure_cookies = config.secure_cookies,
        "Application configured"
    );

    Ok(Router::new()
        .route("/", get(Redirect::temporary(LOGIN_PATH)))
        .nest("/api", api_router)
        .merge(create_pages_router(pages_state)))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), ServerError> {
    let app = create_app(&config)?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await?;
    Ok(())
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), ServerError> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let app = create_app(&config)?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, make_service).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
