//! Public configuration endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Version embedded at compile time from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URLs and settings the browser side is allowed to know.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub api_url: Url,
    pub ai_agent_url: Url,
    pub lead_service_url: Url,
    pub environment: &'static str,
}

#[derive(Clone)]
pub struct ConfigState {
    pub public: Arc<PublicConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    #[serde(flatten)]
    public: PublicConfig,
    version: &'static str,
}

pub fn router(state: ConfigState) -> Router {
    Router::new().route("/", get(get_config)).with_state(state)
}

async fn get_config(State(state): State<ConfigState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        public: state.public.as_ref().clone(),
        version: VERSION,
    })
}
