//! Standard claim checks applied after signature verification.

use serde_json::Value;
use time::OffsetDateTime;

use crate::claims_error::ClaimsError;
use crate::config::JwtConfig;

/// Claim validation settings.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Accepted issuers; empty disables the issuer check.
    pub allowed_issuers: Vec<String>,
    /// Accepted audiences; empty disables the audience check.
    pub allowed_audiences: Vec<String>,
    pub leeway_seconds: i64,
    /// Reject tokens without an `exp` claim.
    pub require_exp: bool,
}

impl From<&JwtConfig> for ValidationConfig {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            allowed_issuers: cfg.issuer().map(str::to_owned).into_iter().collect(),
            allowed_audiences: cfg.audiences.clone(),
            leeway_seconds: i64::try_from(cfg.leeway_seconds).unwrap_or(i64::MAX),
            require_exp: true,
        }
    }
}

/// Validate `iss`, `exp`, `nbf` and `aud` against the configuration.
///
/// # Errors
///
/// Returns the first [`ClaimsError`] encountered.
pub fn validate_claims(
    claims: &Value,
    config: &ValidationConfig,
    now: OffsetDateTime,
) -> Result<(), ClaimsError> {
    validate_issuer(claims, config)?;

    let now = now.unix_timestamp();
    match timestamp_claim(claims, "exp")? {
        Some(exp) if exp.saturating_add(config.leeway_seconds) < now => {
            return Err(ClaimsError::Expired);
        }
        None if config.require_exp => return Err(ClaimsError::MissingClaim("exp".to_owned())),
        _ => {}
    }
    if let Some(nbf) = timestamp_claim(claims, "nbf")?
        && nbf.saturating_sub(config.leeway_seconds) > now
    {
        return Err(ClaimsError::NotYetValid);
    }

    validate_audience(claims, config)
}

fn validate_issuer(claims: &Value, config: &ValidationConfig) -> Result<(), ClaimsError> {
    if config.allowed_issuers.is_empty() {
        return Ok(());
    }
    let issuer = string_claim(claims, "iss")?.ok_or_else(|| ClaimsError::MissingClaim("iss".to_owned()))?;
    if config.allowed_issuers.iter().any(|allowed| allowed == issuer) {
        Ok(())
    } else {
        Err(ClaimsError::InvalidIssuer {
            expected: config.allowed_issuers.clone(),
            actual: issuer.to_owned(),
        })
    }
}

fn validate_audience(claims: &Value, config: &ValidationConfig) -> Result<(), ClaimsError> {
    if config.allowed_audiences.is_empty() {
        return Ok(());
    }
    let actual: Vec<String> = match claims.get("aud") {
        None | Some(Value::Null) => return Err(ClaimsError::MissingClaim("aud".to_owned())),
        Some(Value::String(aud)) => vec![aud.clone()],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Some(_) => {
            return Err(ClaimsError::InvalidClaimFormat {
                claim: "aud".to_owned(),
                reason: "expected string or array of strings".to_owned(),
            });
        }
    };
    if actual
        .iter()
        .any(|aud| config.allowed_audiences.contains(aud))
    {
        Ok(())
    } else {
        Err(ClaimsError::InvalidAudience {
            expected: config.allowed_audiences.clone(),
            actual,
        })
    }
}

fn string_claim<'a>(claims: &'a Value, name: &str) -> Result<Option<&'a str>, ClaimsError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ClaimsError::InvalidClaimFormat {
            claim: name.to_owned(),
            reason: "expected string".to_owned(),
        }),
    }
}

fn timestamp_claim(claims: &Value, name: &str) -> Result<Option<i64>, ClaimsError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| ClaimsError::InvalidClaimFormat {
                claim: name.to_owned(),
                reason: "expected integer seconds since epoch".to_owned(),
            }),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    const ISSUER: &str = "https://idp.example.com";

    fn config() -> ValidationConfig {
        ValidationConfig {
            allowed_issuers: vec![ISSUER.to_owned()],
            allowed_audiences: vec![],
            leeway_seconds: 30,
            require_exp: true,
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn accepts_valid_claims() {
        let claims = json!({"iss": ISSUER, "sub": "jdoe", "exp": 1_700_000_100});
        assert!(validate_claims(&claims, &config(), now()).is_ok());
    }

    #[test]
    fn rejects_foreign_issuer() {
        let claims = json!({"iss": "https://other", "exp": 1_700_000_100});
        let err = validate_claims(&claims, &config(), now()).unwrap_err();
        assert!(matches!(err, ClaimsError::InvalidIssuer { .. }));
    }

    #[test]
    fn expired_token_within_leeway_is_accepted() {
        let claims = json!({"iss": ISSUER, "exp": 1_699_999_980});
        assert!(validate_claims(&claims, &config(), now()).is_ok());
    }

    #[test]
    fn expired_token_beyond_leeway_is_rejected() {
        let claims = json!({"iss": ISSUER, "exp": 1_699_999_000});
        assert_eq!(
            validate_claims(&claims, &config(), now()),
            Err(ClaimsError::Expired)
        );
    }

    #[test]
    fn missing_exp_is_rejected_when_required() {
        let claims = json!({"iss": ISSUER});
        assert_eq!(
            validate_claims(&claims, &config(), now()),
            Err(ClaimsError::MissingClaim("exp".to_owned()))
        );
    }

    #[test]
    fn future_nbf_is_rejected() {
        let claims = json!({"iss": ISSUER, "exp": 1_700_000_900, "nbf": 1_700_000_500});
        assert_eq!(
            validate_claims(&claims, &config(), now()),
            Err(ClaimsError::NotYetValid)
        );
    }

    #[test]
    fn audience_array_must_intersect() {
        let cfg = ValidationConfig {
            allowed_audiences: vec!["portal".to_owned()],
            ..config()
        };
        let ok = json!({"iss": ISSUER, "exp": 1_700_000_100, "aud": ["other", "portal"]});
        assert!(validate_claims(&ok, &cfg, now()).is_ok());

        let bad = json!({"iss": ISSUER, "exp": 1_700_000_100, "aud": "other"});
        assert!(matches!(
            validate_claims(&bad, &cfg, now()),
            Err(ClaimsError::InvalidAudience { .. })
        ));
    }

    #[test]
    fn non_numeric_exp_is_a_format_error() {
        let claims = json!({"iss": ISSUER, "exp": "tomorrow"});
        assert!(matches!(
            validate_claims(&claims, &config(), now()),
            Err(ClaimsError::InvalidClaimFormat { .. })
        ));
    }
}
