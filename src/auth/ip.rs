//! Client IP extraction utilities.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, connect_info::MockConnectInfo},
    http::request::Parts,
};

/// Where the client IP is read from.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IpSource {
    /// The TCP peer address (no proxy in front)
    #[default]
    Socket,
    /// First address of `X-Forwarded-For`
    XForwardedFor,
    /// `X-Real-IP`
    XRealIp,
}

impl IpSource {
    fn header_name(&self) -> Option<&'static str> {
        match self {
            IpSource::Socket => None,
            IpSource::XForwardedFor => Some("x-forwarded-for"),
            IpSource::XRealIp => Some("x-real-ip"),
        }
    }
}

/// Trait for types that provide access to HTTP headers and extensions.
/// Implemented for both `Parts` and `Request` to allow flexible IP extraction.
pub trait HasHeadersAndExtensions {
    fn headers(&self) -> &axum::http::HeaderMap;
    fn extensions(&self) -> &axum::http::Extensions;
}

impl HasHeadersAndExtensions for Parts {
    fn headers(&self) -> &axum::http::HeaderMap {
        &self.headers
    }
    fn extensions(&self) -> &axum::http::Extensions {
        &self.extensions
    }
}

impl<B> HasHeadersAndExtensions for axum::extract::Request<B> {
    fn headers(&self) -> &axum::http::HeaderMap {
        axum::extract::Request::headers(self)
    }
    fn extensions(&self) -> &axum::http::Extensions {
        axum::extract::Request::extensions(self)
    }
}

/// Extract the client IP address.
///
/// With a header source, the header must be present and parse as an IP; there
/// is no fallback to the socket address, since that would be the proxy's.
pub fn extract_client_ip<T: HasHeadersAndExtensions>(
    source: &T,
    ip_source: IpSource,
) -> Result<String, &'static str> {
    match ip_source.header_name() {
        Some(name) => {
            let value = source
                .headers()
                .get(name)
                .ok_or("IP header not present")?
                .to_str()
                .map_err(|_| "IP header contains invalid characters")?;
            let first = value.split(',').next().unwrap_or_default().trim();
            first
                .parse::<std::net::IpAddr>()
                .map(|ip| ip.to_string())
                .map_err(|_| "IP header does not contain an IP address")
        }
        None => {
            let extensions = source.extensions();
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0)
                .or_else(|| extensions.get::<MockConnectInfo<SocketAddr>>().map(|m| m.0))
                .map(|addr| addr.ip().to_string())
                .ok_or("No client IP available")
        }
    }
}
