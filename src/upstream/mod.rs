//! Client for the external backend API.
//!
//! Every call returns `Result<UpstreamReply, UpstreamError>`: a 2xx JSON reply,
//! or an error classified as rejected, unusable or unreachable.

mod client;
mod error;
mod types;

pub use client::{UpstreamClient, UpstreamReply};
pub use error::{ErrorKind, UpstreamError};
pub use types::{IssuedTokens, User, strip_refresh_token};

use axum::http::HeaderMap;

/// Header used to correlate a relay request with the backend calls it makes.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Reuse the inbound request id if it is sane, otherwise mint a new one.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LENGTH
                && id.chars().all(|c| c.is_ascii_graphic())
        })
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
