use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{StoredUser, UserStore};
use authn_resolver_sdk::{AuthnError, FederatedLoginHandler};
use portal_security::{FederatedPrincipal, Principal};
use secrecy::SecretString;

use crate::domain::registrations::Registrations;

/// Display name of a federated principal: preferred username, then name, then subject.
pub(crate) fn display_name(principal: &FederatedPrincipal) -> &str {
    [principal.preferred_username.as_deref(), principal.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(&principal.subject)
}

/// Completes a federated login by mirroring the user into the local store.
pub struct MirroringFederatedLogin {
    registrations: Arc<Registrations>,
    users: Arc<dyn UserStore>,
    authority: String,
}

impl MirroringFederatedLogin {
    /// Mirrored users and returned principals carry `authority`.
    #[must_use]
    pub fn new(registrations: Arc<Registrations>, users: Arc<dyn UserStore>, authority: impl Into<String>) -> Self {
        Self {
            registrations,
            users,
            authority: authority.into(),
        }
    }

    async fn mirror(&self, principal: &FederatedPrincipal) -> Result<(), AuthnError> {
        let display_name = display_name(principal).to_owned();
        let email = principal.email.clone().unwrap_or_default();

        if let Some(mut existing) = self.users.find_by_username(&principal.subject).await? {
            if existing.display_name == display_name && existing.email == email {
                return Ok(());
            }
            existing.display_name = display_name;
            existing.email = email;
            self.users.update(existing).await?;
            tracing::debug!(subject = %principal.subject, "mirrored user updated");
            return Ok(());
        }

        // Federated users never log in locally; an empty hash matches nothing.
        let user = StoredUser {
            username: principal.subject.clone(),
            password_hash: SecretString::from(String::new()),
            enabled: true,
            display_name,
            email,
        };
        self.users.create(user, vec![self.authority.clone()]).await?;
        tracing::info!(subject = %principal.subject, registration = %principal.registration_id, "mirrored new federated user");
        Ok(())
    }
}

#[async_trait]
impl FederatedLoginHandler for MirroringFederatedLogin {
    async fn complete(&self, mut principal: FederatedPrincipal) -> Result<Principal, AuthnError> {
        let Some(registration) = self.registrations.get(&principal.registration_id) else {
            return Err(AuthnError::ProviderRejected(format!(
                "unknown client registration {:?}",
                principal.registration_id
            )));
        };
        if !registration.is_interactive() {
            return Err(AuthnError::ProviderRejected(format!(
                "client registration {:?} does not allow interactive login",
                principal.registration_id
            )));
        }
        if principal.subject.trim().is_empty() {
            return Err(AuthnError::ProviderRejected("missing subject".to_owned()));
        }

        self.mirror(&principal).await?;

        if !principal.authorities.contains(&self.authority) {
            principal.authorities.push(self.authority.clone());
        }
        Ok(Principal::Federated(principal))
    }
}
