use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use url::Url;

/// Build a CSP header from directive key-value pairs
fn join_directives(directives: &[(&str, &str)]) -> String {
    directives
        .iter()
        .map(|(key, value)| format!("{} {}", key, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build the page CSP. Pages may call this server and the given services.
pub fn build_csp(connect_to: &[&Url]) -> String {
    let mut connect_src = vec!["'self'".to_string()];
    for url in connect_to {
        let origin = url.origin().ascii_serialization();
        if origin != "null" && !connect_src.contains(&origin) {
            connect_src.push(origin);
        }
    }
    let connect_src = connect_src.join(" ");

    join_directives(&[
        ("default-src", "'none'"),
        ("script-src", "'self'"),
        ("style-src", "'self'"),
        ("img-src", "'self' data:"),
        ("connect-src", &connect_src),
        ("frame-ancestors", "'none'"),
        ("form-action", "'self'"),
        ("base-uri", "'self'"),
    ])
}

/// Generate a random 128-bit nonce as base64
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Build a CSP header value with a nonce added to script-src
pub fn csp_with_nonce(base_csp: &str, nonce: &str) -> String {
    if let Some(pos) = base_csp.find("script-src ") {
        let insert_pos = pos + "script-src ".len();
        let nonce_value = format!("'nonce-{}' ", nonce);
        let mut result = String::with_capacity(base_csp.len() + nonce_value.len());
        result.push_str(&base_csp[..insert_pos]);
        result.push_str(&nonce_value);
        result.push_str(&base_csp[insert_pos..]);
        result
    } else {
        base_csp.to_string()
    }
}
