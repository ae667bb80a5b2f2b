use portal_auth::JwtConfig;
use secrecy::SecretString;
use serde::Deserialize;

/// Placeholder in `post_logout_redirect_uri` replaced by the request's base URL.
pub const BASE_URL_PLACEHOLDER: &str = "{baseUrl}";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OidcAuthnPluginConfig {
    pub registrations: Vec<ClientRegistration>,
    pub resource_server: ResourceServerConfig,
    /// Where the provider sends the browser after its own logout.
    pub post_logout_redirect_uri: String,
    /// Role granted to every federated user (`ROLE_<role>` authority).
    pub user_role: String,
}

impl Default for OidcAuthnPluginConfig {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            resource_server: ResourceServerConfig::default(),
            post_logout_redirect_uri: BASE_URL_PLACEHOLDER.to_owned(),
            user_role: "user".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceServerConfig {
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    #[default]
    AuthorizationCode,
    /// Machine-to-machine; never offered for interactive login.
    ClientCredentials,
}

/// One OAuth2 client registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientRegistration {
    pub registration_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<SecretString>,
    #[serde(default)]
    pub grant_type: GrantType,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub issuer_uri: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    /// Where the handshake starts; defaults to `/oauth2/authorization/{registration_id}`.
    #[serde(default)]
    pub authorization_uri: Option<String>,
}

impl ClientRegistration {
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.grant_type != GrantType::ClientCredentials
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.client_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.registration_id)
    }

    #[must_use]
    pub fn authorization_uri(&self) -> String {
        self.authorization_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map_or_else(
                || format!("/oauth2/authorization/{}", self.registration_id),
                str::to_owned,
            )
    }

    #[must_use]
    pub fn end_session_endpoint(&self) -> Option<&str> {
        self.end_session_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_applied() {
        let cfg: OidcAuthnPluginConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(cfg.registrations.is_empty());
        assert!(cfg.resource_server.jwt.issuer().is_none());
        assert_eq!(cfg.post_logout_redirect_uri, "{baseUrl}");
        assert_eq!(cfg.user_role, "user");
    }

    #[test]
    fn parses_registrations() {
        let yaml = r#"
registrations:
  - registration_id: "corp"
    client_id: "portal"
    client_secret: "s3cret"
    scopes: ["openid", "profile"]
    issuer_uri: "https://idp.example.com"
    end_session_endpoint: "https://idp.example.com/logout"
    client_name: "Corporate SSO"
  - registration_id: "batch"
    client_id: "batch"
    grant_type: "client_credentials"
resource_server:
  jwt:
    issuer_uri: "https://idp.example.com"
    audiences: ["portal"]
"#;
        let cfg: OidcAuthnPluginConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(cfg.registrations.len(), 2);

        let corp = &cfg.registrations[0];
        assert!(corp.is_interactive());
        assert_eq!(corp.display_name(), "Corporate SSO");
        assert_eq!(corp.authorization_uri(), "/oauth2/authorization/corp");
        assert_eq!(corp.end_session_endpoint(), Some("https://idp.example.com/logout"));

        let batch = &cfg.registrations[1];
        assert_eq!(batch.grant_type, GrantType::ClientCredentials);
        assert!(!batch.is_interactive());
        assert_eq!(batch.display_name(), "batch");

        assert_eq!(cfg.resource_server.jwt.issuer(), Some("https://idp.example.com"));
    }

    #[test]
    fn registration_requires_client_id() {
        let parsed: Result<OidcAuthnPluginConfig, _> =
            serde_saphyr::from_str("registrations:\n  - registration_id: x\n");
        assert!(parsed.is_err());
    }
}
