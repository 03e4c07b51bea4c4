//! Session endpoints: relays credentials to the backend and keeps the issued
//! tokens in httpOnly cookies.
//!
//! - POST `/auth/login` - Exchange credentials for a session
//! - POST `/{segment}/login` - Role-scoped login (`admin`, `organization`, `agent`)
//! - POST `/auth/refresh` - Exchange the refresh cookie for a new token pair
//! - POST `/auth/logout` - Clear both session cookies
//! - GET `/auth/me` - Current user for the access cookie

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, header::SET_COOKIE},
    middleware,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use super::error::{ApiError, Envelope, FieldErrors, UPSTREAM_FAILURE_MESSAGE, is_plausible_email};
use crate::auth::{
    AccessToken, REFRESH_COOKIE_NAME, RefreshToken, ServerSettings, clear_session_cookies,
    get_cookie, issued_session_cookies,
};
use crate::claims::peek_claims;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};
use crate::role::Role;
use crate::upstream::{IssuedTokens, UpstreamClient, UpstreamReply, request_id, strip_refresh_token};

#[derive(Clone)]
pub struct AuthState {
    pub upstream: UpstreamClient,
    pub settings: Arc<ServerSettings>,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

pub fn router(state: AuthState) -> Router {
    let login_router = Router::new()
        .route("/auth/login", post(login))
        .route("/{segment}/login", post(role_login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_login,
        ));

    let session_router = Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .with_state(state);

    Router::new().merge(login_router).merge(session_router)
}

fn field_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Check the credential fields before bothering the backend.
fn validate_credentials(body: &Value) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    match field_str(body, "email") {
        None => {
            errors.insert("email", "Email is required".into());
        }
        Some(email) if !is_plausible_email(email) => {
            errors.insert("email", "Enter a valid email address".into());
        }
        Some(_) => {}
    }

    // Passwords are not trimmed: surrounding spaces may be intentional.
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    if password.is_empty() {
        errors.insert("password", "Password is required".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Turn a successful login/refresh reply into a response that carries the
/// session cookies and the reply body minus the refresh token.
fn session_response(
    state: &AuthState,
    reply: UpstreamReply,
    current_refresh: Option<&str>,
    request_id: &str,
) -> Result<Response, ApiError> {
    let tokens = IssuedTokens::from_body(&reply.body).ok_or_else(|| {
        error!(request_id = %request_id, "Backend reply carried no access token");
        ApiError::BadGateway(UPSTREAM_FAILURE_MESSAGE.into())
    })?;

    let role = peek_claims(&tokens.access_token)
        .ok()
        .and_then(|claims| claims.role);
    info!(
        request_id = %request_id,
        role = role.as_deref().unwrap_or("unknown"),
        rotated_refresh = tokens.refresh_token.is_some(),
        "Session issued"
    );

    let cookies: Vec<_> =
        issued_session_cookies(&tokens, current_refresh, state.settings.secure_cookies)
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie))
            .collect();

    let mut body = reply.body;
    strip_refresh_token(&mut body);

    Ok((reply.status, AppendHeaders(cookies), Json(body)).into_response())
}

async fn login(
    State(state): State<AuthState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = payload?;
    validate_credentials(&credentials)?;

    let request_id = request_id(&headers);
    let reply = state
        .upstream
        .login(&credentials, &request_id)
        .await
        .map_err(|e| ApiError::upstream("Login", e))?;

    session_response(&state, reply, None, &request_id)
}

async fn role_login(
    State(state): State<AuthState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let role = Role::from_login_segment(&segment)
        .ok_or_else(|| ApiError::not_found("Unknown login route"))?;

    let Json(credentials) = payload?;
    validate_credentials(&credentials)?;

    let request_id = request_id(&headers);
    let reply = state
        .upstream
        .role_login(role, &credentials, &request_id)
        .await
        .map_err(|e| ApiError::upstream("Role login", e))?;

    session_response(&state, reply, None, &request_id)
}

/// Exchange the refresh cookie for a new token pair and replace both cookies.
async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
    RefreshToken(refresh_token): RefreshToken,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);
    let reply = state
        .upstream
        .refresh(&refresh_token, &request_id)
        .await
        .map_err(|e| ApiError::upstream("Token refresh", e))?;

    session_response(&state, reply, Some(&refresh_token), &request_id)
}

/// Clear both cookies. Always succeeds, with or without a session.
async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> impl IntoResponse {
    if get_cookie(&headers, REFRESH_COOKIE_NAME).is_some() {
        info!(request_id = %request_id(&headers), "Session closed");
    }

    let [clear_access, clear_refresh] = clear_session_cookies(state.settings.secure_cookies);
    (
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(Envelope::ok("Logged out successfully")),
    )
}

async fn me(
    State(state): State<AuthState>,
    headers: HeaderMap,
    AccessToken(access_token): AccessToken,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);
    let reply = state
        .upstream
        .me(&access_token, &request_id)
        .await
        .map_err(|e| ApiError::upstream("Current user", e))?;

    Ok((reply.status, Json(reply.body)).into_response())
}
