//! Configuration for the API gateway.

use std::time::Duration;

use serde::Deserialize;

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiGatewayConfig {
    pub bind_addr: String,

    /// Name of the session cookie.
    pub session_cookie: String,

    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,

    /// Sessions unused for this long are dropped. `0` keeps them forever.
    pub session_idle_timeout_secs: u64,
}

impl ApiGatewayConfig {
    #[must_use]
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_timeout_secs > 0).then_some(Duration::from_secs(self.session_idle_timeout_secs))
    }
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8070".to_owned(),
            session_cookie: "PORTAL_SESSION".to_owned(),
            secure_cookie: false,
            session_idle_timeout_secs: 1800,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_applied() {
        let cfg: ApiGatewayConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8070");
        assert_eq!(cfg.session_cookie, "PORTAL_SESSION");
        assert!(!cfg.secure_cookie);
        assert_eq!(cfg.session_idle_timeout(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn zero_idle_timeout_disables_expiry() {
        let cfg: ApiGatewayConfig = serde_saphyr::from_str("session_idle_timeout_secs: 0").unwrap();
        assert_eq!(cfg.session_idle_timeout(), None);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let parsed: Result<ApiGatewayConfig, _> = serde_saphyr::from_str("port: 80");
        assert!(parsed.is_err());
    }
}
