#![allow(dead_code)]

//! Shared fixtures: a fake backend API and helpers to drive the relay router.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State, connect_info::MockConnectInfo},
    http::{HeaderMap, Request, Response, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use switchboard::api::PublicConfig;
use switchboard::auth::IpSource;
use switchboard::rate_limit::RateLimits;
use switchboard::{ServerConfig, create_app};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

pub const PASSWORD: &str = "correct-horse";
pub const ACCESS_TTL_SECS: u64 = 900;
const SIGNING_SECRET: &[u8] = b"fake-backend-signing-secret";

/// Accounts known to the fake backend: (email, role, verified).
const ACCOUNTS: &[(&str, &str, bool)] = &[
    ("admin@example.com", "super_admin", true),
    ("org@example.com", "organization_admin", true),
    ("agent@example.com", "agent", true),
    ("pending@example.com", "agent", false),
    ("auditor@example.com", "auditor", true),
];

/// Logging in as this account makes the fake backend answer with HTML.
pub const BROKEN_ACCOUNT: &str = "broken@example.com";

/// Registering this email is refused with 409.
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Debug, Serialize, Deserialize)]
pub struct FakeClaims {
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Sign an HS256 access token the way the backend does.
pub fn issue_access_token(email: &str, role: &str, ttl_secs: u64) -> String {
    let iat = now();
    let claims = FakeClaims {
        sub: email.to_string(),
        role: role.to_string(),
        iat,
        exp: iat + ttl_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .unwrap()
}

pub fn decode_access_token(token: &str) -> Option<FakeClaims> {
    jsonwebtoken::decode::<FakeClaims>(
        token,
        &DecodingKey::from_secret(SIGNING_SECRET),
        &Validation::new(Algorithm::HS256),
    )
    .ok()
    .map(|data| data.claims)
}

fn account(email: &str) -> Option<(&'static str, &'static str, bool)> {
    ACCOUNTS.iter().copied().find(|(e, _, _)| *e == email)
}

fn refresh_token_for(email: &str) -> String {
    format!("refresh:{}", email)
}

fn user_json(email: &str, role: &str, verified: bool) -> Value {
    // Mongoose-style documents carry both ids.
    json!({
        "_id": 42,
        "id": "42",
        "name": email.split('@').next().unwrap_or_default(),
        "email": email,
        "role": role,
        "isVerified": verified,
    })
}

#[derive(Clone, Default)]
struct FakeState {
    request_ids: Arc<Mutex<Vec<String>>>,
}

impl FakeState {
    fn record(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
    }
}

fn rejected(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn session_reply(email: &str, role: &str, verified: bool) -> axum::response::Response {
    Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": user_json(email, role, verified),
            "accessToken": issue_access_token(email, role, ACCESS_TTL_SECS),
            "refreshToken": refresh_token_for(email),
        }
    }))
    .into_response()
}

fn check_credentials(body: &Value) -> Result<(&'static str, &'static str, bool), StatusCode> {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match account(email) {
        Some(found) if password == PASSWORD => Ok(found),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn fake_login(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.record(&headers);
    if body["email"] == BROKEN_ACCOUNT {
        return (StatusCode::OK, "<html>proxy error</html>").into_response();
    }
    match check_credentials(&body) {
        Ok((email, role, verified)) => session_reply(email, role, verified),
        Err(status) => rejected(status, "Invalid email or password"),
    }
}

async fn fake_role_login(
    State(state): State<FakeState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.record(&headers);
    let expected_role = match segment.as_str() {
        "admin" => "super_admin",
        "organization" => "organization_admin",
        "agent" => "agent",
        _ => return rejected(StatusCode::NOT_FOUND, "Not found"),
    };
    match check_credentials(&body) {
        Ok((email, role, verified)) if role == expected_role => {
            session_reply(email, role, verified)
        }
        Ok(_) => rejected(StatusCode::FORBIDDEN, "Access denied for this portal"),
        Err(status) => rejected(status, "Invalid email or password"),
    }
}

/// Issues a new access token but does not rotate the refresh token.
async fn fake_refresh(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.record(&headers);
    let refresh = body["refreshToken"].as_str().unwrap_or_default();
    let found = refresh
        .strip_prefix("refresh:")
        .and_then(account);
    match found {
        Some((email, role, _)) => Json(json!({
            "success": true,
            "data": { "accessToken": issue_access_token(email, role, ACCESS_TTL_SECS) }
        }))
        .into_response(),
        None => rejected(StatusCode::UNAUTHORIZED, "Invalid refresh token"),
    }
}

async fn fake_me(State(state): State<FakeState>, headers: HeaderMap) -> axum::response::Response {
    state.record(&headers);
    let claims = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(decode_access_token);
    match claims.and_then(|c| account(&c.sub)) {
        Some((email, role, verified)) => Json(json!({
            "success": true,
            "data": { "user": user_json(email, role, verified) }
        }))
        .into_response(),
        None => rejected(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
}

async fn fake_register(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.record(&headers);
    if body["email"] == TAKEN_EMAIL {
        return rejected(StatusCode::CONFLICT, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful. Check your email for a code.",
            "data": { "email": body["email"] }
        })),
    )
        .into_response()
}

/// A fake backend API listening on 127.0.0.1.
pub struct FakeUpstream {
    pub url: Url,
    request_ids: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    /// Request ids received so far, in order.
    pub fn request_ids(&self) -> Vec<String> {
        self.request_ids.lock().unwrap().clone()
    }
}

pub async fn spawn_upstream() -> FakeUpstream {
    let state = FakeState::default();
    let request_ids = state.request_ids.clone();

    let router = Router::new()
        .route("/api/auth/login", post(fake_login))
        .route("/api/auth/refresh", post(fake_refresh))
        .route("/api/auth/me", get(fake_me))
        .route("/api/users/register", post(fake_register))
        .route("/api/{segment}/login", post(fake_role_login))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    FakeUpstream {
        url: Url::parse(&format!("http://{}/api", addr)).unwrap(),
        request_ids,
    }
}

/// An address nothing listens on.
pub fn unreachable_upstream() -> Url {
    Url::parse("http://127.0.0.1:9/api").unwrap()
}

pub fn test_config(upstream: &Url) -> ServerConfig {
    ServerConfig {
        upstream_url: upstream.clone(),
        public: PublicConfig {
            api_url: Url::parse("https://api.example.com/api").unwrap(),
            ai_agent_url: Url::parse("https://agents.example.com").unwrap(),
            lead_service_url: Url::parse("https://leads.example.com").unwrap(),
            environment: "test",
        },
        secure_cookies: false,
        ip_source: IpSource::Socket,
        rate_limits: RateLimits::default(),
        upstream_timeout: Duration::from_secs(5),
        csp_nonce: false,
    }
}

/// Build the relay router for tests, with a mocked client address.
pub fn build_app(config: &ServerConfig) -> Router {
    create_app(config)
        .unwrap()
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

pub fn test_app(upstream: &Url) -> Router {
    build_app(&test_config(upstream))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, "POST", uri, None, Some(body)).await
}

pub async fn get_page(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, "GET", uri, cookie, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// The value a Set-Cookie list assigns to `name`, if any.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let first = c.split(';').next()?;
        let (key, value) = first.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// The Set-Cookie entry for `name`, if any.
pub fn cookie_line<'a>(cookies: &'a [String], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
        .map(String::as_str)
}

/// Log in through the relay and return a Cookie header carrying both session cookies.
pub async fn login_cookie_header(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login as {} failed", email);
    let cookies = extract_set_cookies(&response);
    format!(
        "accessToken={}; refreshToken={}",
        cookie_value(&cookies, "accessToken").unwrap(),
        cookie_value(&cookies, "refreshToken").unwrap()
    )
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
