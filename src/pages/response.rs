use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

use super::csp::{csp_with_nonce, generate_nonce};

/// Cache duration for static assets (1 hour)
pub const ASSET_CACHE: &str = "public, max-age=3600";
/// Cache duration for HTML files (no cache, always revalidate)
pub const NO_CACHE: &str = "no-cache";

/// CSP header name
pub const CSP_HEADER: header::HeaderName = header::CONTENT_SECURITY_POLICY;

/// Function signature for HTML response generation.
/// Takes HTML body and CSP header, returns a Response.
pub type HtmlResponder = fn(&str, &'static str) -> Response;

/// Serve an HTML response with CSP header (no nonce)
#[inline]
pub fn html_response_static(body: &str, csp: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, NO_CACHE),
            (CSP_HEADER, csp),
        ],
        body.to_owned(),
    )
        .into_response()
}

/// Serve an HTML response with CSP header and a random nonce
#[inline]
pub fn html_response_with_nonce(body: &str, base_csp: &'static str) -> Response {
    let nonce = generate_nonce();
    let csp = csp_with_nonce(base_csp, &nonce);
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, NO_CACHE),
        ],
        [(CSP_HEADER, csp)],
        body.to_owned(),
    )
        .into_response()
}

/// Get MIME type from file extension. Only supports types we actually serve.
#[inline]
pub fn mime_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serve an embedded HTML page.
#[inline]
pub fn serve_page<T: Embed>(
    name: &str,
    csp_header: &'static str,
    html_responder: HtmlResponder,
) -> Response {
    match T::get(name) {
        Some(content) => {
            let html = String::from_utf8_lossy(&content.data);
            html_responder(&html, csp_header)
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serve a non-HTML asset from embedded files
#[inline]
pub fn serve_asset<T: Embed>(path: &str) -> Response {
    if path.ends_with(".html") {
        return StatusCode::NOT_FOUND.into_response();
    }
    match T::get(path) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, mime_from_path(path)),
                (header::CACHE_CONTROL, ASSET_CACHE),
            ],
            content.data,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
