//! `AuthN` resolver module.

use std::sync::{Arc, OnceLock};

use authn_resolver_sdk::{CapabilityBundle, Collaborators, StartupError};
use tracing::{error, info};

use crate::config::AuthnResolverConfig;
use crate::domain::Service;

/// Holds the capability bundle of the active strategy once startup succeeded.
///
/// The bundle is read-only for the rest of the process lifetime and is
/// shared by every request.
#[derive(Default)]
pub struct AuthnResolver {
    bundle: OnceLock<Arc<CapabilityBundle>>,
}

impl AuthnResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select, build and install the strategy bundle.
    ///
    /// Nothing is installed when any step fails.
    ///
    /// # Errors
    ///
    /// The [`StartupError`] that aborted startup, or
    /// [`StartupError::AlreadyInitialized`] on a second call.
    #[tracing::instrument(skip_all, fields(profiles = %cfg.profiles))]
    pub async fn init(
        &self,
        cfg: AuthnResolverConfig,
        collaborators: &Collaborators,
    ) -> Result<Arc<CapabilityBundle>, StartupError> {
        if self.bundle.get().is_some() {
            return Err(StartupError::AlreadyInitialized);
        }

        let svc = Service::new(cfg);
        let bundle = match svc.resolve(collaborators).await {
            Ok(bundle) => Arc::new(bundle),
            Err(err) => {
                error!(error = %err, "Authentication strategy could not be installed");
                return Err(err);
            }
        };

        self.bundle
            .set(bundle.clone())
            .map_err(|_| StartupError::AlreadyInitialized)?;
        info!(strategy = %bundle.strategy, "Authn resolver initialized");
        Ok(bundle)
    }

    /// The installed bundle, `None` before a successful [`init`](Self::init).
    #[must_use]
    pub fn bundle(&self) -> Option<Arc<CapabilityBundle>> {
        self.bundle.get().cloned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authn_resolver_sdk::StrategyChoice;

    fn cfg(profiles: &str) -> AuthnResolverConfig {
        AuthnResolverConfig {
            profiles: profiles.to_owned(),
            ..AuthnResolverConfig::default()
        }
    }

    #[tokio::test]
    async fn installs_once() {
        let resolver = AuthnResolver::new();
        assert!(resolver.bundle().is_none());

        let bundle = resolver.init(cfg(""), &Collaborators::default()).await.unwrap();
        assert_eq!(bundle.strategy, StrategyChoice::Default);
        assert!(resolver.bundle().is_some());

        let again = resolver.init(cfg(""), &Collaborators::default()).await;
        assert!(matches!(again, Err(StartupError::AlreadyInitialized)));
    }

    #[tokio::test]
    async fn failure_installs_nothing() {
        let resolver = AuthnResolver::new();
        let err = resolver.init(cfg("auth"), &Collaborators::default()).await.unwrap_err();
        assert!(matches!(err, StartupError::MissingCapability { .. }));
        assert!(resolver.bundle().is_none());
    }
}
