use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::chain::{DEFAULT_LOGOUT_URL, LOGIN_PICKER_PATH, path_of};
use authn_resolver_sdk::handlers::SessionHeartbeatHandler;
use authn_resolver_sdk::{
    AuthnStrategyPlugin, CapabilityBundle, ChainPolicy, Collaborators, EntryPoint, Requirement,
    StartupError, StrategyChoice, UserService,
};
use portal_auth::{JwtBearerValidator, TokenValidator, ValidationConfig};
use portal_security::ROLE_PREFIX;
use tracing::info;

use crate::config::{ClientRegistration, OidcAuthnPluginConfig};
use crate::domain::{
    MirroredUserService, MirroringFederatedLogin, OidcIdentityHolder, ProviderLogoutHandler,
    Registrations,
};

/// Federated login strategy over OpenID Connect client registrations.
pub struct OidcAuthnPlugin {
    config: OidcAuthnPluginConfig,
}

impl OidcAuthnPlugin {
    #[must_use]
    pub fn new(config: OidcAuthnPluginConfig) -> Self {
        Self { config }
    }

    fn bearer_validator(
        &self,
        collaborators: &Collaborators,
    ) -> Result<Option<Arc<dyn TokenValidator>>, StartupError> {
        let jwt = &self.config.resource_server.jwt;
        let Some(issuer) = jwt.issuer() else {
            info!("No resource-server issuer configured, bearer tokens are not accepted");
            return Ok(None);
        };
        let Some(provider) = collaborators.key_provider.clone() else {
            return Err(StartupError::missing(self.choice(), "key provider"));
        };
        info!(issuer, key_provider = provider.name(), "Bearer token validation enabled");
        Ok(Some(Arc::new(JwtBearerValidator::new(
            provider,
            ValidationConfig::from(jwt),
        ))))
    }
}

/// Where the provider sends the browser back after the handshake.
pub const OAUTH2_CALLBACK_PATTERN: &str = "/login/oauth2/code/*";

fn entry_point(registrations: &Registrations) -> EntryPoint {
    let mut interactive = registrations.interactive();
    match (interactive.next(), interactive.next()) {
        (None, _) => EntryPoint::Unauthorized,
        (Some(only), None) => EntryPoint::Redirect(only.authorization_uri()),
        _ => EntryPoint::Redirect(LOGIN_PICKER_PATH.to_owned()),
    }
}

/// Local paths the handshake passes through before a session exists.
fn handshake_permits(registrations: &Registrations) -> Vec<String> {
    let mut permits: Vec<String> = registrations
        .interactive()
        .map(ClientRegistration::authorization_uri)
        .filter(|uri| uri.starts_with('/'))
        .map(|uri| path_of(&uri).to_owned())
        .collect();
    if registrations.interactive().next().is_some() {
        permits.push(OAUTH2_CALLBACK_PATTERN.to_owned());
    }
    permits
}

#[async_trait]
impl AuthnStrategyPlugin for OidcAuthnPlugin {
    fn choice(&self) -> StrategyChoice {
        StrategyChoice::Oidc
    }

    async fn build(&self, collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError> {
        let strategy = self.choice();
        if self.config.user_role.trim().is_empty() {
            return Err(StartupError::invalid(strategy, "user_role must not be blank"));
        }
        if self.config.registrations.is_empty() {
            return Err(StartupError::invalid(
                strategy,
                "at least one client registration is required",
            ));
        }
        let registrations = Arc::new(
            Registrations::new(self.config.registrations.clone())
                .map_err(|reason| StartupError::invalid(strategy, reason))?,
        );
        let users = collaborators.require_user_store(strategy)?;
        let sessions = collaborators.require_session_store(strategy)?;
        let bearer_validator = self.bearer_validator(collaborators)?;

        let interactive = registrations.interactive().next().is_some();
        if !interactive && bearer_validator.is_none() {
            return Err(StartupError::missing(strategy, "interactive client registration"));
        }

        let authority = format!("{ROLE_PREFIX}{}", self.config.user_role.trim());
        let user_service: Arc<dyn UserService> =
            Arc::new(MirroredUserService::new(users.clone(), authority.clone()));

        info!(
            registrations = registrations.len(),
            bearer = bearer_validator.is_some(),
            "Building oidc authn strategy"
        );

        Ok(CapabilityBundle {
            strategy,
            identity_holder: Arc::new(OidcIdentityHolder::new(user_service.clone())),
            user_service,
            logout_handler: Arc::new(ProviderLogoutHandler::new(
                sessions.clone(),
                registrations.clone(),
                self.config.post_logout_redirect_uri.clone(),
            )),
            heartbeat_handler: Arc::new(SessionHeartbeatHandler::new(sessions)),
            authentication_provider: None,
            federated_login: Some(Arc::new(MirroringFederatedLogin::new(
                registrations.clone(),
                users,
                authority,
            ))),
            bearer_validator,
            chain_policy: ChainPolicy {
                catch_all: Requirement::RequireAuthenticated,
                login: None,
                login_picker: interactive.then(|| LOGIN_PICKER_PATH.to_owned()),
                permits: handshake_permits(&registrations),
                logout_url: DEFAULT_LOGOUT_URL.to_owned(),
                entry_point: entry_point(&registrations),
            },
            login_options: registrations.login_options(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::GrantType;
    use crate::domain::federated::tests::federated;
    use crate::domain::registrations::test_support::registration;
    use authn_resolver_sdk::ports::InMemoryUserStore;
    use portal_auth::StaticKeyProvider;
    use portal_security::InMemorySessionStore;
    use secrecy::SecretString;
    use tracing_test::traced_test;

    fn collaborators() -> Collaborators {
        Collaborators {
            session_store: Some(Arc::new(InMemorySessionStore::new())),
            user_store: Some(Arc::new(InMemoryUserStore::new())),
            ..Collaborators::default()
        }
    }

    fn config(grants: &[(&str, GrantType)]) -> OidcAuthnPluginConfig {
        OidcAuthnPluginConfig {
            registrations: grants
                .iter()
                .map(|(id, grant)| registration(id, *grant))
                .collect(),
            ..OidcAuthnPluginConfig::default()
        }
    }

    #[tokio::test]
    async fn without_issuer_login_still_works() {
        let plugin = OidcAuthnPlugin::new(config(&[("corp", GrantType::AuthorizationCode)]));
        let bundle = plugin.build(&collaborators()).await.unwrap();
        bundle.validate().unwrap();

        assert!(bundle.bearer_validator.is_none());
        assert_eq!(
            bundle.chain_policy.entry_point,
            EntryPoint::Redirect("/oauth2/authorization/corp".to_owned())
        );

        let federated_login = bundle.federated_login.unwrap();
        let principal = federated_login.complete(federated("corp", "sub-1")).await.unwrap();
        assert!(principal.has_role("user"));
        let user = bundle.user_service.find_by_user_id("sub-1").await.unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn several_registrations_use_the_picker() {
        let plugin = OidcAuthnPlugin::new(config(&[
            ("corp", GrantType::AuthorizationCode),
            ("github", GrantType::AuthorizationCode),
            ("batch", GrantType::ClientCredentials),
        ]));
        let bundle = plugin.build(&collaborators()).await.unwrap();
        assert_eq!(bundle.chain_policy.entry_point, EntryPoint::Redirect("/login".to_owned()));
        assert_eq!(bundle.login_options.len(), 2);
    }

    #[tokio::test]
    async fn no_registrations_is_fatal() {
        let plugin = OidcAuthnPlugin::new(OidcAuthnPluginConfig::default());
        let err = plugin.build(&collaborators()).await.unwrap_err();
        assert!(matches!(err, StartupError::InvalidConfig { .. }));
    }

    fn with_keys() -> Collaborators {
        Collaborators {
            key_provider: Some(Arc::new(StaticKeyProvider::hmac(
                "test",
                &SecretString::from("0123456789abcdef0123456789abcdef"),
            ))),
            ..collaborators()
        }
    }

    #[tokio::test]
    async fn handshake_paths_are_permitted() {
        let plugin = OidcAuthnPlugin::new(config(&[
            ("corp", GrantType::AuthorizationCode),
            ("batch", GrantType::ClientCredentials),
        ]));
        let bundle = plugin.build(&collaborators()).await.unwrap();
        assert_eq!(
            bundle.chain_policy.permits,
            ["/oauth2/authorization/corp", OAUTH2_CALLBACK_PATTERN]
        );
    }

    #[tokio::test]
    async fn client_credentials_only_without_bearer_is_fatal() {
        let plugin = OidcAuthnPlugin::new(config(&[("batch", GrantType::ClientCredentials)]));
        let err = plugin.build(&collaborators()).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::MissingCapability {
                capability: "interactive client registration",
                ..
            }
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn client_credentials_only_serves_bearer_tokens() {
        let mut cfg = config(&[("batch", GrantType::ClientCredentials)]);
        cfg.resource_server.jwt.issuer_uri = Some("https://idp.example.com".to_owned());
        let bundle = OidcAuthnPlugin::new(cfg).build(&with_keys()).await.unwrap();

        assert!(bundle.bearer_validator.is_some());
        assert!(bundle.login_options.is_empty());
        assert_eq!(bundle.chain_policy.entry_point, EntryPoint::Unauthorized);
        assert!(bundle.chain_policy.login_picker.is_none());
        assert!(bundle.chain_policy.permits.is_empty());
        assert!(logs_contain("Bearer token validation enabled"));
    }

    #[tokio::test]
    async fn issuer_requires_key_provider() {
        let mut cfg = config(&[("corp", GrantType::AuthorizationCode)]);
        cfg.resource_server.jwt.issuer_uri = Some("https://idp.example.com".to_owned());
        let plugin = OidcAuthnPlugin::new(cfg);

        let err = plugin.build(&collaborators()).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::MissingCapability { capability: "key provider", .. }
        ));

        let bundle = plugin.build(&with_keys()).await.unwrap();
        assert!(bundle.bearer_validator.is_some());
    }
}
