//! Session-backed handlers shared by the interactive strategies.

use std::sync::Arc;

use async_trait::async_trait;
use portal_security::{BackendIdentity, SecurityContext, SessionStore};

use crate::api::{HeartbeatHandler, IdentityHolder, LogoutHandler, UserService};
use crate::error::AuthnError;
use crate::models::{HeartbeatStatus, LogoutOutcome};

/// Alive while the caller's session is still in the store.
pub struct SessionHeartbeatHandler {
    sessions: Arc<dyn SessionStore>,
}

impl SessionHeartbeatHandler {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl HeartbeatHandler for SessionHeartbeatHandler {
    async fn heartbeat(&self, ctx: &SecurityContext) -> HeartbeatStatus {
        let Some(id) = ctx.session_id() else {
            return HeartbeatStatus::Expired;
        };
        if self.sessions.get(id).await.is_some() {
            HeartbeatStatus::Alive
        } else {
            HeartbeatStatus::Expired
        }
    }
}

/// Invalidates the session and redirects to a fixed target.
pub struct SessionLogoutHandler {
    sessions: Arc<dyn SessionStore>,
    redirect: String,
}

impl SessionLogoutHandler {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>, redirect: impl Into<String>) -> Self {
        Self {
            sessions,
            redirect: redirect.into(),
        }
    }
}

#[async_trait]
impl LogoutHandler for SessionLogoutHandler {
    async fn logout(&self, ctx: &SecurityContext, _base_url: &str) -> Result<LogoutOutcome, AuthnError> {
        if let Some(id) = ctx.session_id() {
            let removed = self.sessions.invalidate(id).await;
            tracing::debug!(removed, "session invalidated on logout");
        }
        Ok(LogoutOutcome::redirect(self.redirect.clone()))
    }
}

/// Looks the principal up through the strategy's user service.
///
/// Principals unknown to the service still get an identity built from their name.
pub struct UserServiceIdentityHolder {
    users: Arc<dyn UserService>,
}

impl UserServiceIdentityHolder {
    #[must_use]
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityHolder for UserServiceIdentityHolder {
    async fn current_identity(&self, ctx: &SecurityContext) -> Result<BackendIdentity, AuthnError> {
        let Some(principal) = ctx.principal() else {
            return Ok(BackendIdentity::anonymous());
        };
        let identity = match self.users.find_by_user_id(principal.name()).await? {
            Some(user) => BackendIdentity::new(user.user_id, user.name, user.email),
            None => BackendIdentity::from_principal_id(principal.name()),
        };
        Ok(identity)
    }
}

/// Identity straight from the principal name, without any lookup.
pub struct PrincipalIdentityHolder;

#[async_trait]
impl IdentityHolder for PrincipalIdentityHolder {
    async fn current_identity(&self, ctx: &SecurityContext) -> Result<BackendIdentity, AuthnError> {
        Ok(ctx
            .principal()
            .map_or_else(BackendIdentity::anonymous, |p| {
                BackendIdentity::from_principal_id(p.name())
            }))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::{NewUser, UserInfo, UserQuery};
    use portal_security::{InMemorySessionStore, LocalPrincipal, Principal};

    fn principal(name: &str) -> Principal {
        Principal::Local(LocalPrincipal {
            username: name.to_owned(),
            authorities: vec![],
        })
    }

    #[tokio::test]
    async fn heartbeat_follows_session_lifetime() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let id = sessions.create(principal("jdoe")).await;
        let ctx = SecurityContext::builder().session_id(id).build();

        let heartbeat = SessionHeartbeatHandler::new(sessions.clone());
        assert_eq!(heartbeat.heartbeat(&ctx).await, HeartbeatStatus::Alive);

        let logout = SessionLogoutHandler::new(sessions, "/signin?#/logout");
        let outcome = logout.logout(&ctx, "http://portal").await.unwrap();
        assert_eq!(outcome.redirect, "/signin?#/logout");

        assert_eq!(heartbeat.heartbeat(&ctx).await, HeartbeatStatus::Expired);
        assert_eq!(
            heartbeat.heartbeat(&SecurityContext::anonymous()).await,
            HeartbeatStatus::Expired
        );
    }

    struct OneUser;

    #[async_trait]
    impl UserService for OneUser {
        async fn search_users(&self, _query: &UserQuery) -> Result<Vec<UserInfo>, AuthnError> {
            Ok(vec![])
        }

        async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, AuthnError> {
            Ok((user_id == "jdoe").then(|| UserInfo::new("jdoe", "John Doe", "jdoe@example.com")))
        }

        async fn find_by_user_ids(&self, _user_ids: &[String]) -> Result<Vec<UserInfo>, AuthnError> {
            Ok(vec![])
        }

        async fn create_or_update(&self, _user: NewUser) -> Result<(), AuthnError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn identity_from_user_service() {
        let holder = UserServiceIdentityHolder::new(Arc::new(OneUser));

        let ctx = SecurityContext::builder().principal(principal("jdoe")).build();
        let identity = holder.current_identity(&ctx).await.unwrap();
        assert_eq!(identity.display_name(), "John Doe");
        assert_eq!(identity.email(), "jdoe@example.com");

        let ctx = SecurityContext::builder().principal(principal("ghost")).build();
        let identity = holder.current_identity(&ctx).await.unwrap();
        assert_eq!(identity.principal_id(), "ghost");

        let identity = holder.current_identity(&SecurityContext::anonymous()).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn identity_from_principal_name() {
        let ctx = SecurityContext::builder().principal(principal("jdoe")).build();
        let identity = PrincipalIdentityHolder.current_identity(&ctx).await.unwrap();
        assert_eq!(identity.principal_id(), "jdoe");
        assert_eq!(identity.display_name(), "jdoe");
    }
}
