//! Programmatic session against a switchboard server.
//!
//! A `SessionClient` is one logged-in (or logged-out) session: a cookie jar
//! holding the httpOnly session cookies, a `TokenStore` with the current access
//! token for direct calls to feature services, and at most one refresh loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::claims::{access_token_lifetime, peek_claims};
use crate::role::Role;
use crate::session::{RefreshHandle, TokenRefresher, TokenStore, spawn_refresh_loop};
use crate::upstream::{IssuedTokens, User};

/// Errors from session client calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Reply carried no access token")]
    MissingToken,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::MissingToken => None,
        }
    }
}

/// What the client knows about its session after login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Role claimed by the access token, if recognised
    pub role: Option<Role>,
    /// Time left until the access token expires
    pub expires_in: Duration,
}

impl SessionInfo {
    fn from_token(token: &str) -> Self {
        Self {
            role: peek_claims(token).ok().and_then(|claims| claims.role()),
            expires_in: access_token_lifetime(token),
        }
    }
}

/// HTTP side of the session, shared with the refresh loop.
struct Transport {
    http: reqwest::Client,
    base: Url,
}

impl Transport {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// POST to a route that issues a session and return the new access token.
    async fn issue(&self, path: &str, body: Option<&Value>) -> Result<String, ClientError> {
        let mut request = self.http.post(self.endpoint(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let body = read_reply(request.send().await?).await?;
        IssuedTokens::from_body(&body)
            .map(|tokens| tokens.access_token)
            .ok_or(ClientError::MissingToken)
    }
}

impl TokenRefresher for Transport {
    type Error = ClientError;

    async fn refresh_access_token(&self) -> Result<String, ClientError> {
        self.issue("/api/auth/refresh", None).await
    }
}

/// Decode a JSON reply, turning non-2xx statuses into `ClientError::Rejected`.
async fn read_reply(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    // Error bodies are the relay's envelope, or whatever the backend sent.
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(ClientError::Rejected { status, message })
}

pub struct SessionClient {
    transport: Arc<Transport>,
    store: TokenStore,
    refresh: Mutex<Option<RefreshHandle>>,
}

impl SessionClient {
    /// Create a logged-out session against the switchboard server at `base`.
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            transport: Arc::new(Transport { http, base }),
            store: TokenStore::new(),
            refresh: Mutex::new(None),
        })
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Whether a refresh loop is currently scheduled for this session.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_slot()
            .as_ref()
            .is_some_and(RefreshHandle::is_running)
    }

    /// Log in through `POST /api/auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionInfo, ClientError> {
        self.start_session("/api/auth/login", email, password).await
    }

    /// Log in through the role-scoped `POST /api/{segment}/login`.
    pub async fn login_as(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<SessionInfo, ClientError> {
        let path = format!("/api/{}/login", role.login_segment());
        self.start_session(&path, email, password).await
    }

    /// Refresh the session now and reschedule the refresh loop.
    pub async fn refresh(&self) -> Result<SessionInfo, ClientError> {
        let token = self.transport.refresh_access_token().await?;
        Ok(self.install(token))
    }

    /// The current user, or `None` when the session is not authenticated.
    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        let response = self
            .transport
            .http
            .get(self.transport.endpoint("/api/auth/me"))
            .send()
            .await?;

        match read_reply(response).await {
            Ok(body) => Ok(User::from_body(&body)),
            Err(ClientError::Rejected { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// End the session. Local state is cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.refresh_slot().take();
        self.store.clear();

        let response = self
            .transport
            .http
            .post(self.transport.endpoint("/api/auth/logout"))
            .send()
            .await?;
        read_reply(response).await?;
        info!("Logged out");
        Ok(())
    }

    /// Attach the stored access token to a direct call to a feature service.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn start_session(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionInfo, ClientError> {
        let credentials = json!({ "email": email, "password": password });
        let token = self.transport.issue(path, Some(&credentials)).await?;
        let session = self.install(token);
        info!(role = ?session.role, "Logged in");
        Ok(session)
    }

    /// Store a fresh token and (re)start the refresh loop for it.
    fn install(&self, token: String) -> SessionInfo {
        let session = SessionInfo::from_token(&token);

        let mut slot = self.refresh_slot();
        // The previous loop must be gone before the new token lands in the store.
        drop(slot.take());
        self.store.set(token);
        *slot = Some(spawn_refresh_loop(self.transport.clone(), self.store.clone()));
        debug!(expires_in_secs = session.expires_in.as_secs(), "Session installed");
        session
    }

    fn refresh_slot(&self) -> MutexGuard<'_, Option<RefreshHandle>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
