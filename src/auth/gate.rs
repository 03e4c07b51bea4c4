//! Auth gate: decides whether a page renders or redirects, based on the user
//! the backend reports for the current `accessToken` cookie.

use axum::http::HeaderMap;
use tracing::debug;

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::state::HasAuthBackend;
use crate::role::Role;
use crate::upstream::{User, request_id};

/// Where unauthenticated visitors of protected pages are sent.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of gating a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    Redirect(&'static str),
}

/// Fetch the current user for the request's `accessToken` cookie.
///
/// Never fails: a missing cookie, an unreachable backend, a rejected token or
/// an unreadable reply all mean "no session". Performs no writes.
pub async fn current_user<S: HasAuthBackend>(state: &S, headers: &HeaderMap) -> Option<User> {
    let token = get_cookie(headers, ACCESS_COOKIE_NAME)?;
    let request_id = request_id(headers);

    match state.upstream().me(token, &request_id).await {
        Ok(reply) => {
            let user = User::from_body(&reply.body);
            if user.is_none() {
                debug!(request_id = %request_id, "Backend /auth/me reply had no user");
            }
            user
        }
        Err(e) => {
            debug!(request_id = %request_id, error = %e, "No session for access token");
            None
        }
    }
}

/// A verified user's own dashboard, if their role is known.
fn verified_home(user: Option<&User>) -> Option<&'static str> {
    user.filter(|u| u.is_verified)
        .and_then(User::role)
        .map(|role| role.dashboard_path())
}

/// Gate for public auth pages (login, signup, ...): signed-in, verified users
/// go to their dashboard; everyone else sees the page.
pub fn gate_guest_page(user: Option<&User>) -> GateDecision {
    match verified_home(user) {
        Some(path) => GateDecision::Redirect(path),
        None => GateDecision::Render,
    }
}

/// Gate for a dashboard subtree owned by `page_role`.
pub fn gate_dashboard(user: Option<&User>, page_role: Role) -> GateDecision {
    match verified_home(user) {
        Some(path) if path == page_role.dashboard_path() => GateDecision::Render,
        Some(path) => GateDecision::Redirect(path),
        // Login renders for this visitor, so this cannot loop.
        None => GateDecision::Redirect(LOGIN_PATH),
    }
}
