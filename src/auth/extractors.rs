//! Axum extractors for session cookies and page gating.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, get_cookie};
use super::errors::{ApiAuthError, AuthErrorKind, GateRedirect};
use super::gate::{GateDecision, current_user, gate_dashboard, gate_guest_page};
use super::state::HasAuthBackend;
use crate::role::Role;
use crate::upstream::User;

// =============================================================================
// Cookie Extractors
// =============================================================================

/// The raw `accessToken` cookie. Rejects with 401 when absent.
pub struct AccessToken(pub String);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
            .map(|token| AccessToken(token.to_string()))
            .ok_or(ApiAuthError::new(AuthErrorKind::NotAuthenticated))
    }
}

/// The raw `refreshToken` cookie. Rejects with 401 when absent.
pub struct RefreshToken(pub String);

impl<S> FromRequestParts<S> for RefreshToken
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_cookie(&parts.headers, REFRESH_COOKIE_NAME)
            .map(|token| RefreshToken(token.to_string()))
            .ok_or(ApiAuthError::new(AuthErrorKind::MissingRefreshToken))
    }
}

// =============================================================================
// Page Extractors
// =============================================================================

/// Marker for the role that owns a dashboard subtree.
pub trait RoleConstraint: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct SuperAdminOnly;
pub struct OrganizationAdminOnly;
pub struct AgentOnly;

impl RoleConstraint for SuperAdminOnly {
    const ROLE: Role = Role::SuperAdmin;
}

impl RoleConstraint for OrganizationAdminOnly {
    const ROLE: Role = Role::OrganizationAdmin;
}

impl RoleConstraint for AgentOnly {
    const ROLE: Role = Role::Agent;
}

/// Extractor for public auth pages (login, signup, ...).
/// Verified users are redirected to their own dashboard instead.
pub struct GuestPage;

impl<S> FromRequestParts<S> for GuestPage
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = GateRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(state, &parts.headers).await;
        match gate_guest_page(user.as_ref()) {
            GateDecision::Render => Ok(GuestPage),
            GateDecision::Redirect(location) => Err(GateRedirect { location }),
        }
    }
}

/// Extractor for dashboard pages owned by role `R`.
/// Visitors without a verified session go to login; other roles go home.
pub struct DashboardPage<R: RoleConstraint> {
    pub user: User,
    _role: PhantomData<R>,
}

impl<S, R> FromRequestParts<S> for DashboardPage<R>
where
    S: HasAuthBackend + Send + Sync,
    R: RoleConstraint,
{
    type Rejection = GateRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(state, &parts.headers).await;
        match (gate_dashboard(user.as_ref(), R::ROLE), user) {
            (GateDecision::Render, Some(user)) => Ok(DashboardPage {
                user,
                _role: PhantomData,
            }),
            (GateDecision::Redirect(location), _) => Err(GateRedirect { location }),
            (GateDecision::Render, None) => Err(GateRedirect {
                location: super::gate::LOGIN_PATH,
            }),
        }
    }
}
