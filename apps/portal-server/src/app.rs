//! Portal endpoints served behind the gateway's authorization chain.

use std::collections::BTreeMap;
use std::sync::Arc;

use api_gateway::GatewayState;
use axum::Router;
use axum::response::Json;
use axum::routing::get;
use server_config::{EffectiveConfig, RefreshableConfigSource};

pub const SERVER_CONFIG_PATH: &str = "/api/server-config";

pub fn app_routes(source: Arc<RefreshableConfigSource>) -> Router<GatewayState> {
    Router::new().route(
        SERVER_CONFIG_PATH,
        get(move || {
            let snapshot = source.snapshot();
            async move { Json(effective_view(&snapshot)) }
        }),
    )
}

fn effective_view(config: &EffectiveConfig) -> BTreeMap<String, String> {
    config
        .iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
