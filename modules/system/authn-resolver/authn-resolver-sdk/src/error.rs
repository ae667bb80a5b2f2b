//! Error types for authentication strategies.

use thiserror::Error;

use crate::models::StrategyChoice;
use crate::ports::StoreError;

/// Per-request authentication failure.
///
/// Credential problems redirect to the failure view; the rest are internal.
#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("bad credentials")]
    BadCredentials,

    #[error("user account is disabled")]
    Disabled,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("identity provider rejected the login: {0}")]
    ProviderRejected(String),

    #[error("user directory is read-only")]
    ReadOnly,

    #[error("invalid user: {0}")]
    InvalidUser(String),

    #[error("directory failure: {0}")]
    Directory(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthnError {
    /// `true` for failures caused by what the caller presented.
    #[must_use]
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::BadCredentials | Self::Disabled | Self::UserNotFound(_) | Self::ProviderRejected(_)
        )
    }
}

/// Fatal failure while selecting or wiring the authentication strategy.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("ambiguous authentication strategy: both {first} and {second} are activated")]
    AmbiguousActivation {
        first: StrategyChoice,
        second: StrategyChoice,
    },

    #[error("{strategy} strategy requires a {capability}")]
    MissingCapability {
        strategy: StrategyChoice,
        capability: &'static str,
    },

    #[error("directory unreachable: {0}")]
    DirectoryUnreachable(String),

    #[error("invalid {strategy} configuration: {reason}")]
    InvalidConfig {
        strategy: StrategyChoice,
        reason: String,
    },

    #[error("authentication strategy already initialized")]
    AlreadyInitialized,
}

impl StartupError {
    #[must_use]
    pub fn missing(strategy: StrategyChoice, capability: &'static str) -> Self {
        Self::MissingCapability {
            strategy,
            capability,
        }
    }

    #[must_use]
    pub fn invalid(strategy: StrategyChoice, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            strategy,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_activation_names_both_strategies() {
        let err = StartupError::AmbiguousActivation {
            first: StrategyChoice::Ldap,
            second: StrategyChoice::Oidc,
        };
        assert_eq!(
            err.to_string(),
            "ambiguous authentication strategy: both ldap and oidc are activated"
        );
    }

    #[test]
    fn credential_failures() {
        assert!(AuthnError::BadCredentials.is_credential_failure());
        assert!(AuthnError::Disabled.is_credential_failure());
        assert!(!AuthnError::ReadOnly.is_credential_failure());
        assert!(!AuthnError::Internal("x".to_owned()).is_credential_failure());
    }
}
