use axum::http::StatusCode;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::error::UpstreamError;
use super::REQUEST_ID_HEADER;
use crate::role::Role;

/// A successful (2xx) JSON reply from the backend.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// HTTP client for the backend API. Cheap to clone.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl UpstreamClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// `POST /auth/login`
    pub async fn login(
        &self,
        credentials: &Value,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let request = self.http.post(self.endpoint("/auth/login")).json(credentials);
        self.send(request, request_id).await
    }

    /// `POST /{segment}/login` for a role-scoped login.
    pub async fn role_login(
        &self,
        role: Role,
        credentials: &Value,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let path = format!("/{}/login", role.login_segment());
        let request = self.http.post(self.endpoint(&path)).json(credentials);
        self.send(request, request_id).await
    }

    /// `POST /auth/refresh`
    pub async fn refresh(
        &self,
        refresh_token: &str,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let request = self
            .http
            .post(self.endpoint("/auth/refresh"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }));
        self.send(request, request_id).await
    }

    /// `GET /auth/me`
    pub async fn me(
        &self,
        access_token: &str,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let request = self
            .http
            .get(self.endpoint("/auth/me"))
            .bearer_auth(access_token);
        self.send(request, request_id).await
    }

    /// `POST /users/register`
    pub async fn register(
        &self,
        payload: &Value,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let request = self.http.post(self.endpoint("/users/register")).json(payload);
        self.send(request, request_id).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        request_id: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let response = request
            .header(REQUEST_ID_HEADER, request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, error = %e, "Backend request failed");
                UpstreamError::Network(e)
            })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        request_id = %request_id,
                        path = %url,
                        status = %status,
                        error = %e,
                        "Backend returned a non-JSON body"
                    );
                    return Err(UpstreamError::BadResponse {
                        status,
                        reason: e.to_string(),
                    });
                }
            }
        };

        if status.is_success() {
            debug!(request_id = %request_id, path = %url, status = %status, "Backend call succeeded");
            Ok(UpstreamReply { status, body })
        } else {
            debug!(request_id = %request_id, path = %url, status = %status, "Backend rejected call");
            Err(UpstreamError::Rejected { status, body })
        }
    }
}
