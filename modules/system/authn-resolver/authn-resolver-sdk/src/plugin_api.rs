use async_trait::async_trait;

use crate::bundle::CapabilityBundle;
use crate::collaborators::Collaborators;
use crate::error::StartupError;
use crate::models::StrategyChoice;

/// Implemented by every authentication strategy plugin.
///
/// The resolver calls [`build`](Self::build) exactly once, for the selected strategy only.
#[async_trait]
pub trait AuthnStrategyPlugin: Send + Sync {
    fn choice(&self) -> StrategyChoice;

    /// Wire the strategy's capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when a collaborator is missing, unreachable or
    /// the configuration is unusable. Startup must abort.
    async fn build(&self, collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError>;
}
