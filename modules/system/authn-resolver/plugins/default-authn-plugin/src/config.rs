use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultAuthnPluginConfig {
    /// Where logout sends the browser.
    pub logout_redirect: String,
}

impl Default for DefaultAuthnPluginConfig {
    fn default() -> Self {
        Self {
            logout_redirect: "/".to_owned(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_applied() {
        let cfg: DefaultAuthnPluginConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(cfg.logout_redirect, "/");
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let parsed: Result<DefaultAuthnPluginConfig, _> = serde_saphyr::from_str("vendor: x");
        assert!(parsed.is_err());
    }
}
