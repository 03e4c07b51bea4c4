//! Authentication error types.

use axum::response::{IntoResponse, Redirect, Response};

use crate::api::ApiError;

/// Internal auth error kind used by the cookie extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    NotAuthenticated,
    MissingRefreshToken,
}

/// API authentication errors (returns the JSON envelope with 401).
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated => "Not authenticated",
            AuthErrorKind::MissingRefreshToken => "No refresh token",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        ApiError::unauthorized(self.message()).into_response()
    }
}

/// Page gate rejection - redirects without touching cookies, so a still-valid
/// refresh token keeps working for later API calls.
#[derive(Debug)]
pub struct GateRedirect {
    pub location: &'static str,
}

impl IntoResponse for GateRedirect {
    fn into_response(self) -> Response {
        Redirect::temporary(self.location).into_response()
    }
}
