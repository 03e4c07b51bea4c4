use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::auth::{AgentOnly, DashboardPage, GuestPage, OrganizationAdminOnly, SuperAdminOnly};

use super::PagesState;
use super::embed::PageAssets;
use super::response::{serve_asset, serve_page};

fn render(state: &PagesState, name: &str) -> Response {
    serve_page::<PageAssets>(name, state.csp_header, state.html_responder)
}

/// Auth pages are only for visitors without a verified session.
macro_rules! guest_page {
    ($handler:ident, $file:literal) => {
        pub async fn $handler(State(state): State<PagesState>, _: GuestPage) -> Response {
            render(&state, $file)
        }
    };
}

guest_page!(login_page, "login.html");
guest_page!(signup_page, "signup.html");
guest_page!(verify_otp_page, "verify-otp.html");
guest_page!(forgot_password_page, "forgot-password.html");
guest_page!(reset_password_page, "reset-password.html");

/// Serve the super admin dashboard shell (any sub-path; routing is client side)
pub async fn admin_dashboard(
    State(state): State<PagesState>,
    _: DashboardPage<SuperAdminOnly>,
) -> Response {
    render(&state, "admin.html")
}

/// Serve the organization dashboard shell
pub async fn organization_dashboard(
    State(state): State<PagesState>,
    _: DashboardPage<OrganizationAdminOnly>,
) -> Response {
    render(&state, "organization.html")
}

/// Serve the agent dashboard shell
pub async fn agent_dashboard(
    State(state): State<PagesState>,
    _: DashboardPage<AgentOnly>,
) -> Response {
    render(&state, "agent.html")
}

/// Serve page stylesheets and scripts (public)
pub async fn static_asset(Path(path): Path<String>) -> Response {
    serve_asset::<PageAssets>(&path)
}
