//! CLI argument parsing, validation, and startup helpers.

use std::time::Duration;

use clap::Parser;
use tracing::error;
use url::Url;

use crate::ServerConfig;
use crate::api::PublicConfig;
use crate::auth::IpSource;
use crate::rate_limit::RateLimits;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment environment. Production turns on `Secure` cookies.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn secure_cookies(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "switchboard",
    about = "Session relay and page gate for the call-center dashboard"
)]
pub struct Args {
    /// Base URL of the backend API that issues tokens
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: String,

    /// Backend API URL as seen from browsers
    #[arg(long, env = "NEXT_PUBLIC_API_URL")]
    pub public_api_url: String,

    /// AI agent service URL
    #[arg(long, env = "AI_AGENT_API_URL")]
    pub ai_agent_url: String,

    /// Lead service URL
    #[arg(long, env = "LEAD_API_URL")]
    pub lead_service_url: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Deployment environment
    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Where to read the client IP from when behind a proxy
    #[arg(long, env = "IP_HEADER", value_enum, default_value = "socket")]
    pub ip_header: IpSource,

    /// Timeout for backend calls, in seconds
    #[arg(long, default_value = "15")]
    pub upstream_timeout_secs: u64,

    /// Add a random nonce to CSP headers for each HTML response, does not affect script tags
    #[arg(long)]
    pub csp_nonce: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate a service URL setting.
/// Returns None and logs an error if validation fails.
pub fn validate_service_url(setting: &str, value: &str) -> Option<Url> {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => {
            error!(setting = %setting, value = %value, error = %e, "Invalid URL");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        error!(setting = %setting, value = %value, "URL must be http(s) with a host");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from arguments, validating every URL.
/// Returns None after logging each invalid setting.
pub fn build_config(args: &Args) -> Option<ServerConfig> {
    let upstream_url = validate_service_url("API_BASE_URL", &args.api_base_url);
    let api_url = validate_service_url("NEXT_PUBLIC_API_URL", &args.public_api_url);
    let ai_agent_url = validate_service_url("AI_AGENT_API_URL", &args.ai_agent_url);
    let lead_service_url = validate_service_url("LEAD_API_URL", &args.lead_service_url);

    let (Some(upstream_url), Some(api_url), Some(ai_agent_url), Some(lead_service_url)) =
        (upstream_url, api_url, ai_agent_url, lead_service_url)
    else {
        return None;
    };

    if args.upstream_timeout_secs == 0 {
        error!("upstream-timeout-secs must be greater than zero");
        return None;
    }

    Some(ServerConfig {
        upstream_url,
        public: PublicConfig {
            api_url,
            ai_agent_url,
            lead_service_url,
            environment: args.environment.as_str(),
        },
        secure_cookies: args.environment.secure_cookies(),
        ip_source: args.ip_header,
        rate_limits: RateLimits::default(),
        upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
        csp_nonce: args.csp_nonce,
    })
}
