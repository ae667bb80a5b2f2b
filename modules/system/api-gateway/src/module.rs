//! Gateway assembly and the HTTP serve loop.

use std::sync::Arc;

use authn_resolver_sdk::CapabilityBundle;
use axum::Router;
use portal_security::SessionStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::{GatewayState, SessionCookie, authn_middleware};
use crate::chain::{AuthorizationChainBuilder, BY_PASS_URLS, ChainError};
use crate::config::ApiGatewayConfig;
use crate::routes::auth_routes;

/// Build the authorization chain for the bundle and wrap everything the
/// middleware and routes share.
///
/// # Errors
///
/// [`ChainError`] when the strategy's policy yields an invalid chain.
pub fn gateway_state(
    cfg: &ApiGatewayConfig,
    bundle: Arc<CapabilityBundle>,
    sessions: Arc<dyn SessionStore>,
) -> Result<GatewayState, ChainError> {
    let chain = AuthorizationChainBuilder::new()
        .bypass(BY_PASS_URLS.iter().copied())
        .policy(&bundle.chain_policy)
        .build()?;
    info!(
        strategy = %bundle.strategy,
        rules = chain.rules().count(),
        "Authorization chain built"
    );
    Ok(GatewayState {
        bundle,
        chain: Arc::new(chain),
        sessions,
        cookie: SessionCookie::new(cfg.session_cookie.clone(), cfg.secure_cookie),
    })
}

/// Auth routes merged with the application's own, behind the authentication middleware.
pub fn build_router(state: GatewayState, app: Router<GatewayState>) -> Router {
    auth_routes(&state.bundle.chain_policy)
        .merge(app)
        .layer(axum::middleware::from_fn_with_state(state.clone(), authn_middleware))
        .with_state(state)
}

/// Serve `router` on the configured address until `cancel` fires.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops with an I/O error.
pub async fn serve(cfg: &ApiGatewayConfig, router: Router, cancel: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
