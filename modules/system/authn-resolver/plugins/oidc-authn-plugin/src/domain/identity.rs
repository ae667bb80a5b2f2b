use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::{AuthnError, IdentityHolder, UserService};
use portal_security::{BackendIdentity, Principal, SecurityContext};

use crate::domain::federated::display_name;

/// Identity from the federated principal's claims; bearer callers are
/// resolved through the local user service.
pub struct OidcIdentityHolder {
    users: Arc<dyn UserService>,
}

impl OidcIdentityHolder {
    #[must_use]
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityHolder for OidcIdentityHolder {
    async fn current_identity(&self, ctx: &SecurityContext) -> Result<BackendIdentity, AuthnError> {
        let identity = match ctx.principal() {
            None => BackendIdentity::anonymous(),
            Some(Principal::Federated(p)) => BackendIdentity::new(
                p.subject.clone(),
                display_name(p),
                p.email.clone().unwrap_or_default(),
            ),
            Some(Principal::Bearer(p)) => match self.users.find_by_user_id(&p.subject).await? {
                Some(user) => BackendIdentity::new(user.user_id, user.name, user.email),
                None => BackendIdentity::from_principal_id(p.subject.clone()),
            },
            Some(principal @ Principal::Local(_)) => BackendIdentity::from_principal_id(principal.name()),
        };
        Ok(identity)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::federated::tests::federated;
    use crate::domain::users::MirroredUserService;
    use authn_resolver_sdk::NewUser;
    use authn_resolver_sdk::ports::InMemoryUserStore;
    use portal_security::BearerPrincipal;

    fn holder() -> (OidcIdentityHolder, Arc<dyn UserService>) {
        let users: Arc<dyn UserService> = Arc::new(MirroredUserService::new(
            Arc::new(InMemoryUserStore::new()),
            "ROLE_user",
        ));
        (OidcIdentityHolder::new(users.clone()), users)
    }

    #[tokio::test]
    async fn federated_identity_uses_claims() {
        let (holder, _) = holder();
        let ctx = SecurityContext::builder()
            .principal(Principal::Federated(federated("corp", "sub-1")))
            .build();
        let identity = holder.current_identity(&ctx).await.unwrap();
        assert_eq!(identity.principal_id(), "sub-1");
        assert_eq!(identity.display_name(), "jdoe");
        assert_eq!(identity.email(), "jdoe@example.com");
    }

    #[tokio::test]
    async fn bearer_identity_is_looked_up() {
        let (holder, users) = holder();
        users
            .create_or_update(NewUser {
                username: "svc-7".to_owned(),
                password: None,
                display_name: "Reporting".to_owned(),
                email: String::new(),
                enabled: true,
            })
            .await
            .unwrap();

        let bearer = |subject: &str| {
            SecurityContext::builder()
                .principal(Principal::Bearer(BearerPrincipal {
                    subject: subject.to_owned(),
                    claims: serde_json::json!({ "sub": subject }),
                    authorities: Vec::new(),
                }))
                .build()
        };
        let known = holder.current_identity(&bearer("svc-7")).await.unwrap();
        assert_eq!(known.display_name(), "Reporting");
        let unknown = holder.current_identity(&bearer("svc-8")).await.unwrap();
        assert_eq!(unknown.display_name(), "svc-8");
    }

    #[tokio::test]
    async fn anonymous_without_principal() {
        let (holder, _) = holder();
        let identity = holder.current_identity(&SecurityContext::anonymous()).await.unwrap();
        assert!(identity.is_anonymous());
    }
}
