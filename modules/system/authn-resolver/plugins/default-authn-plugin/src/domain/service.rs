//! Capabilities of the default strategy.
//!
//! Nothing authenticates: every caller is the anonymous identity, sessions
//! never expire and user writes are dropped.

use async_trait::async_trait;
use authn_resolver_sdk::{
    AuthnError, HeartbeatHandler, HeartbeatStatus, IdentityHolder, LogoutHandler, LogoutOutcome,
    NewUser, UserInfo, UserQuery, UserService,
};
use portal_security::{ANONYMOUS_PRINCIPAL_ID, BackendIdentity, SecurityContext};

fn anonymous_user() -> UserInfo {
    let identity = BackendIdentity::anonymous();
    UserInfo::new(identity.principal_id(), identity.display_name(), identity.email())
}

pub struct AnonymousIdentityHolder;

#[async_trait]
impl IdentityHolder for AnonymousIdentityHolder {
    async fn current_identity(&self, _ctx: &SecurityContext) -> Result<BackendIdentity, AuthnError> {
        Ok(BackendIdentity::anonymous())
    }
}

/// Knows exactly one user: the anonymous one.
pub struct AnonymousUserService;

#[async_trait]
impl UserService for AnonymousUserService {
    async fn search_users(&self, _query: &UserQuery) -> Result<Vec<UserInfo>, AuthnError> {
        Ok(vec![anonymous_user()])
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, AuthnError> {
        Ok((user_id == ANONYMOUS_PRINCIPAL_ID).then(anonymous_user))
    }

    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, AuthnError> {
        let wanted = user_ids.iter().any(|id| id == ANONYMOUS_PRINCIPAL_ID);
        Ok(if wanted { vec![anonymous_user()] } else { vec![] })
    }

    async fn create_or_update(&self, user: NewUser) -> Result<(), AuthnError> {
        tracing::debug!(username = %user.username, "ignoring user write without a user backend");
        Ok(())
    }
}

pub struct AlwaysAliveHeartbeat;

#[async_trait]
impl HeartbeatHandler for AlwaysAliveHeartbeat {
    async fn heartbeat(&self, _ctx: &SecurityContext) -> HeartbeatStatus {
        HeartbeatStatus::Alive
    }
}

pub struct RedirectLogoutHandler {
    target: String,
}

impl RedirectLogoutHandler {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl LogoutHandler for RedirectLogoutHandler {
    async fn logout(&self, _ctx: &SecurityContext, _base_url: &str) -> Result<LogoutOutcome, AuthnError> {
        Ok(LogoutOutcome::redirect(self.target.clone()))
    }
}
