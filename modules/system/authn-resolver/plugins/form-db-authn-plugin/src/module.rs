use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::handlers::{
    SessionHeartbeatHandler, SessionLogoutHandler, UserServiceIdentityHolder,
};
use authn_resolver_sdk::ports::{DelegatingPasswordEncoder, PasswordEncoder};
use authn_resolver_sdk::{
    AuthnStrategyPlugin, CapabilityBundle, ChainPolicy, Collaborators, Requirement, StartupError,
    StrategyChoice, UserService,
};
use tracing::info;

use crate::config::FormDbAuthnPluginConfig;
use crate::domain::{StoreAuthenticationProvider, StoreUserService};

/// Form login strategy over the local user store.
pub struct FormDbAuthnPlugin {
    config: FormDbAuthnPluginConfig,
}

impl FormDbAuthnPlugin {
    #[must_use]
    pub fn new(config: FormDbAuthnPluginConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AuthnStrategyPlugin for FormDbAuthnPlugin {
    fn choice(&self) -> StrategyChoice {
        StrategyChoice::FormDb
    }

    async fn build(&self, collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError> {
        let strategy = self.choice();
        if self.config.user_role.trim().is_empty() {
            return Err(StartupError::invalid(strategy, "user_role must not be blank"));
        }

        let users = collaborators.require_user_store(strategy)?;
        let sessions = collaborators.require_session_store(strategy)?;
        let encoder: Arc<dyn PasswordEncoder> = collaborators
            .password_encoder
            .clone()
            .unwrap_or_else(|| Arc::new(DelegatingPasswordEncoder::default()));

        let user_service: Arc<dyn UserService> = Arc::new(StoreUserService::new(
            users.clone(),
            encoder.clone(),
            &self.config.user_role,
        ));

        info!(
            login_page = %self.config.login_page,
            user_role = %self.config.user_role,
            "Building form-db authn strategy"
        );

        Ok(CapabilityBundle {
            strategy,
            identity_holder: Arc::new(UserServiceIdentityHolder::new(user_service.clone())),
            user_service,
            logout_handler: Arc::new(SessionLogoutHandler::new(
                sessions.clone(),
                self.config.logout_success_url.clone(),
            )),
            heartbeat_handler: Arc::new(SessionHeartbeatHandler::new(sessions)),
            authentication_provider: Some(Arc::new(StoreAuthenticationProvider::new(users, encoder))),
            federated_login: None,
            bearer_validator: None,
            chain_policy: ChainPolicy::form_login(
                Requirement::RequireRole(self.config.user_role.clone()),
                self.config.login_surface(),
            ),
            login_options: Vec::new(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authn_resolver_sdk::EntryPoint;
    use authn_resolver_sdk::ports::InMemoryUserStore;
    use portal_security::InMemorySessionStore;

    fn collaborators() -> Collaborators {
        Collaborators {
            session_store: Some(Arc::new(InMemorySessionStore::new())),
            user_store: Some(Arc::new(InMemoryUserStore::new())),
            ..Collaborators::default()
        }
    }

    #[tokio::test]
    async fn builds_form_login_bundle() {
        let plugin = FormDbAuthnPlugin::new(FormDbAuthnPluginConfig::default());
        let bundle = plugin.build(&collaborators()).await.unwrap();

        assert_eq!(bundle.strategy, StrategyChoice::FormDb);
        assert_eq!(
            bundle.chain_policy.catch_all,
            Requirement::RequireRole("user".to_owned())
        );
        assert_eq!(
            bundle.chain_policy.entry_point,
            EntryPoint::Redirect("/signin".to_owned())
        );
        assert!(bundle.authentication_provider.is_some());
        bundle.validate().unwrap();
    }

    #[tokio::test]
    async fn missing_user_store_is_fatal() {
        let plugin = FormDbAuthnPlugin::new(FormDbAuthnPluginConfig::default());
        let collaborators = Collaborators {
            user_store: None,
            ..collaborators()
        };
        let err = plugin.build(&collaborators).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::MissingCapability { capability: "user store", .. }
        ));
    }

    #[tokio::test]
    async fn blank_role_is_rejected() {
        let plugin = FormDbAuthnPlugin::new(FormDbAuthnPluginConfig {
            user_role: " ".to_owned(),
            ..FormDbAuthnPluginConfig::default()
        });
        let err = plugin.build(&collaborators()).await.unwrap_err();
        assert!(matches!(err, StartupError::InvalidConfig { .. }));
    }
}
