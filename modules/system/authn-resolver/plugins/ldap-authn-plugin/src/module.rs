use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::handlers::{
    SessionHeartbeatHandler, SessionLogoutHandler, UserServiceIdentityHolder,
};
use authn_resolver_sdk::{
    AuthnStrategyPlugin, CapabilityBundle, ChainPolicy, Collaborators, LoginSurface, Requirement,
    StartupError, StrategyChoice, UserService,
};
use tracing::{error, info};

use crate::config::LdapAuthnPluginConfig;
use crate::domain::filter::{Filter, bind_placeholder};
use crate::domain::{BindAuthenticationProvider, DirectoryUserService, UserSearch};

/// Form login strategy bound against a directory server.
pub struct LdapAuthnPlugin {
    config: LdapAuthnPluginConfig,
}

impl LdapAuthnPlugin {
    #[must_use]
    pub fn new(config: LdapAuthnPluginConfig) -> Self {
        Self { config }
    }

    fn check_config(&self) -> Result<(), StartupError> {
        let strategy = StrategyChoice::Ldap;
        let cfg = &self.config;
        if !cfg.search_filter.contains("{0}") {
            return Err(StartupError::invalid(
                strategy,
                "search_filter must contain the {0} login placeholder",
            ));
        }
        Filter::parse(&bind_placeholder(&cfg.search_filter, "login"))
            .map_err(|e| StartupError::invalid(strategy, format!("search_filter: {e}")))?;
        if cfg.group.is_enabled() {
            Filter::parse(cfg.group.group_search.trim())
                .map_err(|e| StartupError::invalid(strategy, format!("group_search: {e}")))?;
        }
        if cfg.mapping.login_id.trim().is_empty() {
            return Err(StartupError::invalid(strategy, "mapping.login_id must not be blank"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthnStrategyPlugin for LdapAuthnPlugin {
    fn choice(&self) -> StrategyChoice {
        StrategyChoice::Ldap
    }

    async fn build(&self, collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError> {
        let strategy = self.choice();
        self.check_config()?;

        let directory = collaborators.require_directory(strategy)?;
        let sessions = collaborators.require_session_store(strategy)?;

        if let Err(err) = directory.check_connection().await {
            error!(urls = ?self.config.urls, error = %err, "Directory server is unreachable");
            return Err(StartupError::DirectoryUnreachable(err.to_string()));
        }

        let search = Arc::new(UserSearch::new(directory.clone(), &self.config));
        let user_service: Arc<dyn UserService> = Arc::new(DirectoryUserService::new(search.clone()));

        info!(
            base = %self.config.base,
            group_filter = search.group_filter_enabled(),
            "Building ldap authn strategy"
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
            authentication_provider: Some(Arc::new(BindAuthenticationProvider::new(directory, search))),
            federated_login: None,
            bearer_validator: None,
            chain_policy: ChainPolicy::form_login(
                Requirement::RequireAuthenticated,
                LoginSurface::default(),
            ),
            login_options: Vec::new(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::infra::InMemoryDirectory;
    use authn_resolver_sdk::{Credentials, UserQuery};
    use authn_resolver_sdk::ports::DirectoryEntry;
    use portal_security::InMemorySessionStore;
    use secrecy::SecretString;

    const BASE: &str = "dc=example,dc=org";

    fn directory() -> Arc<InMemoryDirectory> {
        let dir = InMemoryDirectory::new();
        dir.add_user(
            DirectoryEntry::new(format!("uid=jdoe,ou=people,{BASE}"))
                .with_attribute("objectClass", ["inetOrgPerson"])
                .with_attribute("uid", ["jdoe"])
                .with_attribute("cn", ["John Doe"]),
            SecretString::from("secret"),
        );
        Arc::new(dir)
    }

    fn collaborators(directory: Arc<InMemoryDirectory>) -> Collaborators {
        Collaborators {
            session_store: Some(Arc::new(InMemorySessionStore::new())),
            directory: Some(directory),
            ..Collaborators::default()
        }
    }

    fn plugin() -> LdapAuthnPlugin {
        LdapAuthnPlugin::new(LdapAuthnPluginConfig {
            base: BASE.to_owned(),
            ..LdapAuthnPluginConfig::default()
        })
    }

    #[tokio::test]
    async fn builds_directory_bundle() {
        let bundle = plugin().build(&collaborators(directory())).await.unwrap();
        assert_eq!(bundle.strategy, StrategyChoice::Ldap);
        assert_eq!(bundle.chain_policy.catch_all, Requirement::RequireAuthenticated);
        bundle.validate().unwrap();

        let provider = bundle.authentication_provider.unwrap();
        let principal = provider
            .authenticate(&Credentials::new("jdoe", "secret"))
            .await
            .unwrap();
        assert_eq!(principal.name(), "jdoe");

        let users = bundle.user_service.search_users(&UserQuery::default()).await.unwrap();
        assert_eq!(users[0].name, "John Doe");
    }

    #[tokio::test]
    async fn unreachable_directory_is_fatal() {
        let dir = directory();
        dir.set_reachable(false);
        let err = plugin().build(&collaborators(dir)).await.unwrap_err();
        assert!(matches!(err, StartupError::DirectoryUnreachable(_)));
    }

    #[tokio::test]
    async fn missing_directory_client_is_fatal() {
        let collaborators = Collaborators {
            directory: None,
            ..collaborators(directory())
        };
        let err = plugin().build(&collaborators).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::MissingCapability { capability: "directory client", .. }
        ));
    }

    #[tokio::test]
    async fn invalid_filters_are_rejected() {
        for filter in ["(uid=jdoe)", "uid={0}"] {
            let plugin = LdapAuthnPlugin::new(LdapAuthnPluginConfig {
                search_filter: filter.to_owned(),
                ..LdapAuthnPluginConfig::default()
            });
            let err = plugin.build(&collaborators(directory())).await.unwrap_err();
            assert!(matches!(err, StartupError::InvalidConfig { .. }), "{filter}");
        }
    }
}
