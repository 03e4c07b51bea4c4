use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, FieldErrors, is_plausible_email};
use crate::rate_limit::{RateLimitConfig, rate_limit_register};
use crate::upstream::{UpstreamClient, request_id};

const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
pub struct UsersState {
    pub upstream: UpstreamClient,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config,
            rate_limit_register,
        ))
}

fn text<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or("")
}

fn validate_registration(body: &Value) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    let name = text(body, "name").trim();
    if name.is_empty() {
        errors.insert("name", "Name is required".into());
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.insert(
            "name",
            format!("Name cannot be longer than {} characters", MAX_NAME_LENGTH),
        );
    }

    let email = text(body, "email").trim();
    if email.is_empty() {
        errors.insert("email", "Email is required".into());
    } else if !is_plausible_email(email) {
        errors.insert("email", "Enter a valid email address".into());
    }

    let password = text(body, "password");
    if password.is_empty() {
        errors.insert("password", "Password is required".into());
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password",
            format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Relay a signup to the backend. No session is created here; the user still
/// has to verify their account and log in.
async fn register(
    State(state): State<UsersState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    validate_registration(&body)?;

    let request_id = request_id(&headers);
    let reply = state
        .upstream
        .register(&body, &request_id)
        .await
        .map_err(|e| ApiError::upstream("Registration", e))?;

    info!(request_id = %request_id, "User registered");
    Ok((reply.status, Json(reply.body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors_of(body: Value) -> FieldErrors {
        match validate_registration(&body) {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_registration() {
        let body = json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "correct horse",
            "organizationName": "Analytical Engines"
        });
        assert!(validate_registration(&body).is_ok());
    }

    #[test]
    fn test_every_field_reported() {
        let errors = errors_of(json!({}));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_short_password() {
        let errors = errors_of(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "short"
        }));
        assert_eq!(errors.len(), 1);
        assert!(errors["password"].contains("at least 8"));
    }

    #[test]
    fn test_long_name() {
        let errors = errors_of(json!({
            "name": "a".repeat(101),
            "email": "ada@example.com",
            "password": "long enough"
        }));
        assert!(errors.contains_key("name"));
    }
}
