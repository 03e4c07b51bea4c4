//! Shared error handling for API endpoints.
//!
//! Every failure leaves the relay as the JSON envelope
//! `{ "success": false, "message": ..., "errors"?: { field: message } }`,
//! except backend rejections, which are relayed with their own status and body.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::error;

use crate::upstream::UpstreamError;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Message shown to users when the backend misbehaves.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "The service is temporarily unavailable. Please try again.";

/// Message shown to users when the backend cannot be reached.
pub const NETWORK_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// API error type with automatic response conversion.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Validation(FieldErrors),
    Unauthorized(String),
    NotFound(String),
    TooManyRequests(String),
    Forbidden(String),
    BadGateway(String),
    Internal(String),
    /// Backend rejection, relayed unchanged
    Relay { status: StatusCode, body: Value },
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::TooManyRequests(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Map a failed backend call, logging the real cause.
    pub fn upstream(context: &str, e: UpstreamError) -> Self {
        match e {
            UpstreamError::Rejected { status, body } => Self::Relay { status, body },
            UpstreamError::BadResponse { status, reason } => {
                error!(status = %status, reason = %reason, "{}: unusable backend response", context);
                Self::BadGateway(UPSTREAM_FAILURE_MESSAGE.into())
            }
            UpstreamError::Network(e) => {
                error!(error = %e, "{}: backend unreachable", context);
                Self::Internal(NETWORK_FAILURE_MESSAGE.into())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// The JSON envelope shared by all relay-generated responses.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            ApiError::Relay { status, body } => {
                // A rejection without a body still needs to say something.
                let body = if body.is_null() {
                    serde_json::to_value(Envelope::failure(
                        status.canonical_reason().unwrap_or("Request failed"),
                    ))
                    .unwrap_or(Value::Null)
                } else {
                    body
                };
                return (status, Json(body)).into_response();
            }
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Envelope {
                    success: false,
                    message: "Validation failed".into(),
                    errors: Some(errors),
                },
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Envelope::failure(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, Envelope::failure(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Envelope::failure(msg)),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, Envelope::failure(msg))
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, Envelope::failure(msg)),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, Envelope::failure(msg)),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Envelope::failure(msg))
            }
        };
        (status, Json(envelope)).into_response()
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
