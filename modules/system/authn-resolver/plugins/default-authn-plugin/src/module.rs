use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::{
    AuthnStrategyPlugin, CapabilityBundle, ChainPolicy, Collaborators, StartupError, StrategyChoice,
};
use tracing::info;

use crate::config::DefaultAuthnPluginConfig;
use crate::domain::{AlwaysAliveHeartbeat, AnonymousIdentityHolder, AnonymousUserService, RedirectLogoutHandler};

/// Strategy used when no authentication backend is activated.
pub struct DefaultAuthnPlugin {
    config: DefaultAuthnPluginConfig,
}

impl DefaultAuthnPlugin {
    #[must_use]
    pub fn new(config: DefaultAuthnPluginConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AuthnStrategyPlugin for DefaultAuthnPlugin {
    fn choice(&self) -> StrategyChoice {
        StrategyChoice::Default
    }

    async fn build(&self, _collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError> {
        info!("Building default authn strategy: all requests are anonymous");

        Ok(CapabilityBundle {
            strategy: StrategyChoice::Default,
            identity_holder: Arc::new(AnonymousIdentityHolder),
            user_service: Arc::new(AnonymousUserService),
            logout_handler: Arc::new(RedirectLogoutHandler::new(self.config.logout_redirect.clone())),
            heartbeat_handler: Arc::new(AlwaysAliveHeartbeat),
            authentication_provider: None,
            federated_login: None,
            bearer_validator: None,
            chain_policy: ChainPolicy::permit_all(),
            login_options: Vec::new(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authn_resolver_sdk::Requirement;

    #[tokio::test]
    async fn builds_without_collaborators() {
        let plugin = DefaultAuthnPlugin::new(DefaultAuthnPluginConfig::default());
        let bundle = plugin.build(&Collaborators::default()).await.unwrap();

        assert_eq!(bundle.strategy, StrategyChoice::Default);
        assert_eq!(bundle.chain_policy.catch_all, Requirement::Permit);
        assert!(bundle.chain_policy.login.is_none());
        assert!(bundle.authentication_provider.is_none());
        bundle.validate().unwrap();
    }
}
