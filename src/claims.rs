//! Reading claims from access tokens issued by the backend.
//!
//! The backend signs its tokens with a key the relay never sees, so claims are
//! read without signature validation. They are only used to size cookie
//! lifetimes and refresh schedules, never to make authorization decisions;
//! those always go through `GET /auth/me`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::role::Role;

/// Lifetime assumed for an access token whose `exp` claim cannot be read: 15 minutes
pub const DEFAULT_ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token cookie lifetime: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// The subset of backend JWT claims the relay cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Role name as issued by the backend
    #[serde(default)]
    pub role: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<u64>,
}

impl TokenClaims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    /// Time left until `exp`, measured from `now` (Unix seconds).
    /// Returns `None` when the token carries no expiry.
    pub fn expires_in(&self, now: u64) -> Option<Duration> {
        self.exp
            .map(|exp| Duration::from_secs(exp.saturating_sub(now)))
    }
}

/// Errors that can occur while reading token claims.
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("Malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("Token payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the claims of a JWT without verifying its signature.
pub fn peek_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    // Rejects anything that is not a three-part token with a valid header.
    jsonwebtoken::decode_header(token)?;

    let payload = token.split('.').nth(1).unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// How long the given access token remains valid.
/// Falls back to the default lifetime when the token has no readable `exp`.
pub fn access_token_lifetime(token: &str) -> Duration {
    match peek_claims(token) {
        Ok(claims) => claims
            .expires_in(now_secs())
            .unwrap_or(Duration::from_secs(DEFAULT_ACCESS_TOKEN_DURATION_SECS)),
        Err(e) => {
            tracing::debug!(error = %e, "Could not read access token expiry");
            Duration::from_secs(DEFAULT_ACCESS_TOKEN_DURATION_SECS)
        }
    }
}
