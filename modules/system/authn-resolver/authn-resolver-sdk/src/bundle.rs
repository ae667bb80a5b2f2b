use std::sync::Arc;

use portal_auth::TokenValidator;

use crate::api::{
    AuthenticationProvider, FederatedLoginHandler, HeartbeatHandler, IdentityHolder, LogoutHandler,
    UserService,
};
use crate::chain::ChainPolicy;
use crate::error::StartupError;
use crate::models::{LoginOption, StrategyChoice};

/// The complete set of capabilities produced by one strategy.
///
/// Built once at startup; shared read-only by all requests afterwards.
pub struct CapabilityBundle {
    pub strategy: StrategyChoice,
    pub identity_holder: Arc<dyn IdentityHolder>,
    pub user_service: Arc<dyn UserService>,
    pub logout_handler: Arc<dyn LogoutHandler>,
    pub heartbeat_handler: Arc<dyn HeartbeatHandler>,
    pub authentication_provider: Option<Arc<dyn AuthenticationProvider>>,
    pub federated_login: Option<Arc<dyn FederatedLoginHandler>>,
    pub bearer_validator: Option<Arc<dyn TokenValidator>>,
    pub chain_policy: ChainPolicy,
    pub login_options: Vec<LoginOption>,
}

impl CapabilityBundle {
    /// Cross-check the bundle against its own chain policy.
    ///
    /// # Errors
    ///
    /// [`StartupError::MissingCapability`] when the policy exposes a login
    /// surface nothing can serve.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.chain_policy.login.is_some() && self.authentication_provider.is_none() {
            return Err(StartupError::missing(self.strategy, "authentication provider"));
        }
        if self.chain_policy.login_picker.is_some() && self.federated_login.is_none() {
            return Err(StartupError::missing(self.strategy, "federated login handler"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CapabilityBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityBundle")
            .field("strategy", &self.strategy)
            .field("authentication_provider", &self.authentication_provider.is_some())
            .field("federated_login", &self.federated_login.is_some())
            .field("bearer_validator", &self.bearer_validator.is_some())
            .field("chain_policy", &self.chain_policy)
            .field("login_options", &self.login_options)
            .finish_non_exhaustive()
    }
}
