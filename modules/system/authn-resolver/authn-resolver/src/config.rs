//! Configuration for the AuthN resolver.

use default_authn_plugin::DefaultAuthnPluginConfig;
use form_db_authn_plugin::FormDbAuthnPluginConfig;
use ldap_authn_plugin::LdapAuthnPluginConfig;
use oidc_authn_plugin::OidcAuthnPluginConfig;
use serde::Deserialize;

/// Resolver configuration: the activation signal plus per-strategy settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthnResolverConfig {
    /// Active profiles, comma separated (e.g. `"prod,ldap"`).
    pub profiles: String,
    pub default: DefaultAuthnPluginConfig,
    pub form_db: FormDbAuthnPluginConfig,
    pub ldap: LdapAuthnPluginConfig,
    pub oidc: OidcAuthnPluginConfig,
}
