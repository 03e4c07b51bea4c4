//! Shapes of the backend's JSON payloads.
//!
//! The backend is not consistent about wrapping: some endpoints return
//! `{ accessToken, ... }`, others `{ success, data: { accessToken, user } }`.
//! Lookups below try the body itself, then `data`, then `tokens` nested in
//! either.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::role::Role;

pub const ACCESS_TOKEN_FIELD: &str = "accessToken";
pub const REFRESH_TOKEN_FIELD: &str = "refreshToken";

/// Objects of a reply body that may carry token or user fields, outermost first.
fn containers(body: &Value) -> Vec<&Value> {
    let mut out = vec![body];
    if let Some(data) = body.get("data") {
        out.push(data);
        if let Some(tokens) = data.get("tokens") {
            out.push(tokens);
        }
    }
    if let Some(tokens) = body.get("tokens") {
        out.push(tokens);
    }
    out
}

fn lookup_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    containers(body)
        .into_iter()
        .find_map(|v| v.get(field).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

/// Token pair found in a login or refresh reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Absent when the backend does not rotate refresh tokens
    pub refresh_token: Option<String>,
}

impl IssuedTokens {
    pub fn from_body(body: &Value) -> Option<Self> {
        let access_token = lookup_str(body, ACCESS_TOKEN_FIELD)?.to_string();
        let refresh_token = lookup_str(body, REFRESH_TOKEN_FIELD).map(str::to_string);
        Some(Self {
            access_token,
            refresh_token,
        })
    }
}

/// Remove every `refreshToken` field from a reply body before it is relayed.
/// The refresh token only ever travels in its httpOnly cookie.
pub fn strip_refresh_token(body: &mut Value) {
    if let Some(obj) = body.as_object_mut() {
        obj.remove(REFRESH_TOKEN_FIELD);
        for key in ["data", "tokens"] {
            if let Some(inner) = obj.get_mut(key) {
                strip_refresh_token(inner);
            }
        }
    }
}

/// The current user as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_organization: Option<Value>,
}

/// `User` as it arrives on the wire: the id may come as `id`, `_id` or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default, deserialize_with = "optional_id")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "optional_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    owned_organization: Option<Value>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.mongo_id)
            .ok_or_else(|| "user has no id".to_string())?;
        Ok(Self {
            id,
            name: raw.name,
            email: raw.email,
            role: raw.role,
            is_verified: raw.is_verified,
            owned_organization: raw.owned_organization,
        })
    }
}

impl User {
    /// Find and decode the user object in a reply body.
    pub fn from_body(body: &Value) -> Option<Self> {
        let mut candidates = Vec::new();
        for container in containers(body) {
            if let Some(user) = container.get("user") {
                candidates.push(user);
            }
        }
        if let Some(data) = body.get("data") {
            candidates.push(data);
        }
        candidates.push(body);

        candidates
            .into_iter()
            .find_map(|v| serde_json::from_value::<User>(v.clone()).ok())
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
