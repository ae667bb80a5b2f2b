use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::{AuthnError, LogoutHandler, LogoutOutcome};
use portal_security::{FederatedPrincipal, Principal, SecurityContext, SessionStore};
use secrecy::ExposeSecret;
use url::Url;

use crate::config::BASE_URL_PLACEHOLDER;
use crate::domain::registrations::Registrations;

/// Ends the local session, then the provider's when it has an end-session endpoint.
pub struct ProviderLogoutHandler {
    sessions: Arc<dyn SessionStore>,
    registrations: Arc<Registrations>,
    post_logout_redirect_uri: String,
}

impl ProviderLogoutHandler {
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        registrations: Arc<Registrations>,
        post_logout_redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            registrations,
            post_logout_redirect_uri: post_logout_redirect_uri.into(),
        }
    }

    fn provider_logout(&self, principal: &FederatedPrincipal, base_url: &str) -> Option<String> {
        let endpoint = self
            .registrations
            .get(&principal.registration_id)?
            .end_session_endpoint()?;
        let mut url = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "invalid end-session endpoint");
                return None;
            }
        };
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = &principal.id_token {
                query.append_pair("id_token_hint", token.expose_secret());
            }
            query.append_pair(
                "post_logout_redirect_uri",
                &self.post_logout_redirect_uri.replace(BASE_URL_PLACEHOLDER, base_url),
            );
        }
        Some(url.into())
    }
}

fn base_or_root(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() }
}

#[async_trait]
impl LogoutHandler for ProviderLogoutHandler {
    async fn logout(&self, ctx: &SecurityContext, base_url: &str) -> Result<LogoutOutcome, AuthnError> {
        if let Some(id) = ctx.session_id() {
            let removed = self.sessions.invalidate(id).await;
            tracing::debug!(removed, "session invalidated on logout");
        }

        let base_url = base_url.trim().trim_end_matches('/');
        let target = match ctx.principal() {
            Some(Principal::Federated(principal)) => self.provider_logout(principal, base_url),
            _ => None,
        };
        Ok(LogoutOutcome::redirect(target.unwrap_or_else(|| base_or_root(base_url))))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::GrantType;
    use crate::domain::federated::tests::federated;
    use crate::domain::registrations::test_support::registration;
    use portal_security::InMemorySessionStore;
    use secrecy::SecretString;

    fn handler(sessions: Arc<InMemorySessionStore>) -> ProviderLogoutHandler {
        let mut corp = registration("corp", GrantType::AuthorizationCode);
        corp.end_session_endpoint = Some("https://idp.example.com/logout".to_owned());
        let plain = registration("plain", GrantType::AuthorizationCode);
        let registrations = Registrations::new(vec![corp, plain]).unwrap();
        ProviderLogoutHandler::new(sessions, Arc::new(registrations), "{baseUrl}/signin")
    }

    #[tokio::test]
    async fn redirects_to_end_session_endpoint() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let mut principal = federated("corp", "sub-1");
        principal.id_token = Some(SecretString::from("tok.en"));
        let principal = Principal::Federated(principal);
        let id = sessions.create(principal.clone()).await;
        let ctx = SecurityContext::builder()
            .session_id(id.clone())
            .principal(principal)
            .build();

        let outcome = handler(sessions.clone())
            .logout(&ctx, "https://portal.example.com/")
            .await
            .unwrap();

        let url = Url::parse(&outcome.redirect).unwrap();
        assert_eq!(url.path(), "/logout");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("id_token_hint".to_owned(), "tok.en".to_owned()),
                (
                    "post_logout_redirect_uri".to_owned(),
                    "https://portal.example.com/signin".to_owned()
                ),
            ]
        );
        assert!(sessions.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn falls_back_to_base_url() {
        let handler = handler(Arc::new(InMemorySessionStore::new()));
        let ctx = SecurityContext::builder()
            .principal(Principal::Federated(federated("plain", "sub-1")))
            .build();
        let outcome = handler.logout(&ctx, "https://portal.example.com").await.unwrap();
        assert_eq!(outcome.redirect, "https://portal.example.com");

        let outcome = handler.logout(&SecurityContext::anonymous(), "").await.unwrap();
        assert_eq!(outcome.redirect, "/");
    }
}
