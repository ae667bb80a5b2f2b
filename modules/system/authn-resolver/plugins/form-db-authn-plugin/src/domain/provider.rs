use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{PasswordEncoder, UserStore};
use authn_resolver_sdk::{AuthenticationProvider, AuthnError, Credentials};
use portal_security::{LocalPrincipal, Principal};

/// Checks form credentials against the user store.
pub struct StoreAuthenticationProvider {
    users: Arc<dyn UserStore>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl StoreAuthenticationProvider {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { users, encoder }
    }
}

#[async_trait]
impl AuthenticationProvider for StoreAuthenticationProvider {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthnError> {
        let username = credentials.username.trim();
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!(username, "login for unknown user");
            return Err(AuthnError::BadCredentials);
        };

        // Password first, so a wrong password never reveals the account state.
        if !self.encoder.matches(&credentials.password, &user.password_hash) {
            tracing::debug!(username, "password mismatch");
            return Err(AuthnError::BadCredentials);
        }
        if !user.enabled {
            return Err(AuthnError::Disabled);
        }

        let authorities = self.users.authorities(&user.username).await?;
        Ok(Principal::Local(LocalPrincipal {
            username: user.username,
            authorities,
        }))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authn_resolver_sdk::ports::{DelegatingPasswordEncoder, InMemoryUserStore, StoredUser};
    use secrecy::SecretString;

    fn provider() -> StoreAuthenticationProvider {
        let encoder = Arc::new(DelegatingPasswordEncoder::default());
        let store = InMemoryUserStore::new();
        store.insert(
            StoredUser {
                username: "apollo".to_owned(),
                password_hash: encoder.encode(&SecretString::from("admin")),
                enabled: true,
                display_name: "apollo".to_owned(),
                email: "apollo@acme.com".to_owned(),
            },
            vec!["ROLE_user".to_owned()],
        );
        store.insert(
            StoredUser {
                username: "retired".to_owned(),
                password_hash: SecretString::from("{noop}secret"),
                enabled: false,
                display_name: "Retired".to_owned(),
                email: String::new(),
            },
            vec!["ROLE_user".to_owned()],
        );
        StoreAuthenticationProvider::new(Arc::new(store), encoder)
    }

    #[tokio::test]
    async fn valid_credentials_yield_principal_with_authorities() {
        let principal = provider()
            .authenticate(&Credentials::new("apollo", "admin"))
            .await
            .unwrap();
        assert_eq!(principal.name(), "apollo");
        assert!(principal.has_role("user"));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let provider = provider();
        let unknown = provider
            .authenticate(&Credentials::new("nobody", "admin"))
            .await
            .unwrap_err();
        let wrong = provider
            .authenticate(&Credentials::new("apollo", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthnError::BadCredentials));
        assert!(matches!(wrong, AuthnError::BadCredentials));
    }

    #[tokio::test]
    async fn disabled_user_is_rejected() {
        let provider = provider();
        let err = provider
            .authenticate(&Credentials::new("retired", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthnError::Disabled));

        let err = provider
            .authenticate(&Credentials::new("retired", "guess"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthnError::BadCredentials));
    }
}
