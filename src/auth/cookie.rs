//! Session cookie parsing and `Set-Cookie` construction.

use axum::http::header;

use crate::claims::{REFRESH_TOKEN_DURATION_SECS, access_token_lifetime};
use crate::upstream::IssuedTokens;

/// Cookie name for the access token (lifetime follows the token's `exp`).
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie name for the refresh token (7 days).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once('=') {
                let value = value.trim();
                if key.trim() == name && !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Build a session `Set-Cookie` value.
pub fn session_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// Build a `Set-Cookie` value that deletes the named cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

/// Both deletion cookies, access first.
pub fn clear_session_cookies(secure: bool) -> [String; 2] {
    [
        clear_cookie(ACCESS_COOKIE_NAME, secure),
        clear_cookie(REFRESH_COOKIE_NAME, secure),
    ]
}

/// Cookies for a freshly issued token pair.
///
/// When the backend did not rotate the refresh token, `current_refresh` is
/// re-set so its lifetime is extended alongside the new access token.
pub fn issued_session_cookies(
    tokens: &IssuedTokens,
    current_refresh: Option<&str>,
    secure: bool,
) -> Vec<String> {
    let access_max_age = access_token_lifetime(&tokens.access_token).as_secs();
    let mut cookies = vec![session_cookie(
        ACCESS_COOKIE_NAME,
        &tokens.access_token,
        access_max_age,
        secure,
    )];

    if let Some(refresh) = tokens.refresh_token.as_deref().or(current_refresh) {
        cookies.push(session_cookie(
            REFRESH_COOKIE_NAME,
            refresh,
            REFRESH_TOKEN_DURATION_SECS,
            secure,
        ));
    }

    cookies
}
