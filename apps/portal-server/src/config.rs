//! Application configuration: one YAML document plus `PORTAL__` environment overrides.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use api_gateway::ApiGatewayConfig;
use authn_resolver::AuthnResolverConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::Deserialize;
use server_config::{ConfigEntry, ServerConfigSettings};

pub const ENV_PREFIX: &str = "PORTAL__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub gateway: ApiGatewayConfig,
    pub authn: AuthnResolverConfig,
    pub server_config: ServerConfigSettings,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Data loaded into the in-memory stores at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub users: Vec<SeedUser>,
    pub directory: Vec<SeedDirectoryEntry>,
    pub server_config: Vec<ConfigEntry>,
    /// HMAC secret bearer tokens are signed with.
    pub token_secret: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub authorities: Vec<String>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDirectoryEntry {
    pub dn: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Bind password; entries without one cannot log in.
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl AppConfig {
    /// Load `path` (when given) and apply environment overrides.
    ///
    /// Nested keys use `__` in variable names, e.g.
    /// `PORTAL__AUTHN__PROFILES=prod,ldap`.
    ///
    /// # Errors
    ///
    /// Fails when the file is unreadable or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(path.exists(), "config file {} does not exist", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid portal configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_a_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.json);
        assert!(cfg.authn.profiles.is_empty());
        assert!(cfg.seed.users.is_empty());
    }

    #[test]
    fn loads_yaml_file() {
        let file = write_yaml(
            r#"
logging:
  level: "debug"
  json: true
gateway:
  bind_addr: "0.0.0.0:9000"
authn:
  profiles: "prod,auth"
server_config:
  data_center: "SHAOY"
seed:
  token_secret: "hmac-secret"
  users:
    - username: "admin"
      password: "admin"
      authorities: ["ROLE_user"]
  directory:
    - dn: "uid=jdoe,dc=example,dc=org"
      attributes:
        uid: ["jdoe"]
      password: "pw"
  server_config:
    - key: "portal.title"
      value: "Portal"
      cluster: "default"
"#,
        );
        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.json);
        assert_eq!(cfg.gateway.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.authn.profiles, "prod,auth");
        assert_eq!(cfg.server_config.data_center, "SHAOY");

        let admin = &cfg.seed.users[0];
        assert!(admin.enabled);
        assert_eq!(admin.password.expose_secret(), "admin");
        assert_eq!(cfg.seed.directory[0].attributes["uid"], ["jdoe"]);
        assert_eq!(cfg.seed.server_config[0].key, "portal.title");
        assert!(cfg.seed.token_secret.is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/portal.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_yaml("gatewy:\n  bind_addr: \"0.0.0.0:1\"\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/portal.yaml");
        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.authn.profiles, "dev,auth");
        assert_eq!(cfg.authn.oidc.registrations.len(), 1);
        assert_eq!(cfg.seed.directory.len(), 2);
    }
}
