//! Capability traits every authentication strategy supplies.
//!
//! Implementations are shared across concurrent requests for the lifetime of
//! the process and must not keep per-request state.

use async_trait::async_trait;
use portal_security::{BackendIdentity, FederatedPrincipal, Principal, SecurityContext};

use crate::error::AuthnError;
use crate::models::{Credentials, HeartbeatStatus, LogoutOutcome, NewUser, UserInfo, UserQuery};

/// Resolves the identity of the current caller.
#[async_trait]
pub trait IdentityHolder: Send + Sync {
    /// Returns the anonymous identity for unauthenticated callers.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError`] when the backing user lookup fails.
    async fn current_identity(&self, ctx: &SecurityContext) -> Result<BackendIdentity, AuthnError>;
}

/// User lookup and maintenance for the active backend.
#[async_trait]
pub trait UserService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthnError`] when the backing store or directory fails.
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserInfo>, AuthnError>;

    /// # Errors
    ///
    /// Returns [`AuthnError`] when the backing store or directory fails.
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, AuthnError>;

    /// # Errors
    ///
    /// Returns [`AuthnError`] when the backing store or directory fails.
    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, AuthnError>;

    /// Create the user, or update password, display name and email of an existing one.
    ///
    /// # Errors
    ///
    /// [`AuthnError::ReadOnly`] for backends that do not own their users.
    async fn create_or_update(&self, user: NewUser) -> Result<(), AuthnError>;
}

#[async_trait]
pub trait LogoutHandler: Send + Sync {
    /// Ends the caller's session and returns the redirect target.
    ///
    /// `base_url` is the externally visible origin of the portal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError`] when the session cannot be ended.
    async fn logout(&self, ctx: &SecurityContext, base_url: &str) -> Result<LogoutOutcome, AuthnError>;
}

#[async_trait]
pub trait HeartbeatHandler: Send + Sync {
    async fn heartbeat(&self, ctx: &SecurityContext) -> HeartbeatStatus;
}

/// Checks interactive form credentials.
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// # Errors
    ///
    /// [`AuthnError::BadCredentials`] for unknown users and wrong passwords,
    /// [`AuthnError::Disabled`] for disabled accounts.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthnError>;
}

/// Completes a federated login once the provider handshake has produced a principal.
#[async_trait]
pub trait FederatedLoginHandler: Send + Sync {
    /// # Errors
    ///
    /// [`AuthnError::ProviderRejected`] for unknown or non-interactive registrations.
    async fn complete(&self, principal: FederatedPrincipal) -> Result<Principal, AuthnError>;
}
