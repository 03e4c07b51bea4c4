//! Server-rendered page shells, gated by the session role.
//!
//! Auth pages (login, signup, ...) render only for visitors without a verified
//! session; each dashboard subtree renders only for its own role.

mod csp;
mod embed;
mod handlers;
mod response;

use axum::{Router, routing::get};
use tracing::info;
use url::Url;

use crate::impl_has_auth_backend;
use crate::role::{ADMIN_DASHBOARD_PATH, AGENT_DASHBOARD_PATH, ORGANIZATION_DASHBOARD_PATH};
use crate::upstream::UpstreamClient;

pub use csp::{build_csp, csp_with_nonce, generate_nonce};
pub use response::{HtmlResponder, html_response_static, html_response_with_nonce};

/// State for page routes.
#[derive(Clone)]
pub struct PagesState {
    pub upstream: UpstreamClient,
    /// CSP header for HTML responses
    pub csp_header: &'static str,
    /// Selected at startup based on whether CSP nonces are enabled
    pub html_responder: HtmlResponder,
}

impl_has_auth_backend!(PagesState);

impl PagesState {
    pub fn new(
        upstream: UpstreamClient,
        connect_to: &[&Url],
        csp_nonce: bool,
    ) -> Self {
        // Built once per server; handlers only need the &'static str.
        let csp_header: &'static str = Box::leak(build_csp(connect_to).into_boxed_str());
        info!(csp = csp_header, nonce = csp_nonce, "Page CSP configured");

        let html_responder: HtmlResponder = if csp_nonce {
            html_response_with_nonce
        } else {
            html_response_static
        };

        Self {
            upstream,
            csp_header,
            html_responder,
        }
    }
}

/// Create the page router (auth pages, dashboards, static assets).
pub fn create_pages_router(state: PagesState) -> Router {
    let admin_subtree = format!("{}/{{*path}}", ADMIN_DASHBOARD_PATH);
    let organization_subtree = format!("{}/{{*path}}", ORGANIZATION_DASHBOARD_PATH);
    let agent_subtree = format!("{}/{{*path}}", AGENT_DASHBOARD_PATH);

    Router::new()
        .route("/login", get(handlers::login_page))
        .route("/signup", get(handlers::signup_page))
        .route("/verify-otp", get(handlers::verify_otp_page))
        .route("/forgot-password", get(handlers::forgot_password_page))
        .route("/reset-password", get(handlers::reset_password_page))
        .route(ADMIN_DASHBOARD_PATH, get(handlers::admin_dashboard))
        .route(&admin_subtree, get(handlers::admin_dashboard))
        .route(
            ORGANIZATION_DASHBOARD_PATH,
            get(handlers::organization_dashboard),
        )
        .route(&organization_subtree, get(handlers::organization_dashboard))
        .route(AGENT_DASHBOARD_PATH, get(handlers::agent_dashboard))
        .route(&agent_subtree, get(handlers::agent_dashboard))
        .route("/static/{*path}", get(handlers::static_asset))
        .with_state(state)
}
