use serde::{Deserialize, Serialize};

/// Resource-server JWT configuration.
///
/// Bearer validation is only installed when `issuer_uri` is set to a non-blank value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    /// Expected `iss` claim.
    pub issuer_uri: Option<String>,

    /// Accepted `aud` values; empty disables the audience check.
    pub audiences: Vec<String>,

    /// Clock skew tolerated for `exp`/`nbf`.
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer_uri: None,
            audiences: Vec::new(),
            leeway_seconds: 60,
        }
    }
}

impl JwtConfig {
    /// The configured issuer, if any and non-blank.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer_uri
            .as_deref()
            .map(str::trim)
            .filter(|issuer| !issuer.is_empty())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn blank_issuer_is_treated_as_absent() {
        let cfg = JwtConfig {
            issuer_uri: Some("   ".to_owned()),
            ..JwtConfig::default()
        };
        assert!(cfg.issuer().is_none());
    }

    #[test]
    fn issuer_is_trimmed() {
        let cfg = JwtConfig {
            issuer_uri: Some(" https://idp.example.com ".to_owned()),
            ..JwtConfig::default()
        };
        assert_eq!(cfg.issuer(), Some("https://idp.example.com"));
    }
}
