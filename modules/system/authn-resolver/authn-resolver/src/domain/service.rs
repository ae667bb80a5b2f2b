//! Builds the capability bundle of the selected strategy.

use authn_resolver_sdk::{
    AuthnStrategyPlugin, CapabilityBundle, Collaborators, StartupError, StrategyChoice,
};
use default_authn_plugin::DefaultAuthnPlugin;
use form_db_authn_plugin::FormDbAuthnPlugin;
use ldap_authn_plugin::LdapAuthnPlugin;
use oidc_authn_plugin::OidcAuthnPlugin;
use tracing::info;

use crate::config::AuthnResolverConfig;
use crate::domain::selector::select;

/// Resolver service: selection plus plugin construction.
pub struct Service {
    config: AuthnResolverConfig,
}

impl Service {
    #[must_use]
    pub fn new(config: AuthnResolverConfig) -> Self {
        Self { config }
    }

    /// Plugin implementing `choice`, configured from its section.
    #[must_use]
    pub fn plugin(&self, choice: StrategyChoice) -> Box<dyn AuthnStrategyPlugin> {
        match choice {
            StrategyChoice::Default => Box::new(DefaultAuthnPlugin::new(self.config.default.clone())),
            StrategyChoice::FormDb => Box::new(FormDbAuthnPlugin::new(self.config.form_db.clone())),
            StrategyChoice::Ldap => Box::new(LdapAuthnPlugin::new(self.config.ldap.clone())),
            StrategyChoice::Oidc => Box::new(OidcAuthnPlugin::new(self.config.oidc.clone())),
        }
    }

    /// Select the strategy and build its validated bundle.
    ///
    /// # Errors
    ///
    /// Any [`StartupError`] from selection, plugin construction or bundle validation.
    #[tracing::instrument(skip_all, fields(strategy))]
    pub async fn resolve(&self, collaborators: &Collaborators) -> Result<CapabilityBundle, StartupError> {
        let choice = select(&self.config.profiles)?;
        tracing::Span::current().record("strategy", choice.as_str());
        info!(profiles = %self.config.profiles, strategy = %choice, "Selected authn strategy");

        let plugin = self.plugin(choice);
        let bundle = plugin.build(collaborators).await?;
        bundle.validate()?;
        Ok(bundle)
    }
}
