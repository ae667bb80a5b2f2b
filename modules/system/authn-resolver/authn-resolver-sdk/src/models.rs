//! Models shared by the resolver, its strategies and the gateway.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Authentication backend active for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyChoice {
    /// No authentication; every caller is the anonymous identity.
    Default,
    /// Form login against the local user store.
    FormDb,
    /// Form login bound against a directory server.
    Ldap,
    /// Federated login through OpenID Connect providers.
    Oidc,
}

impl StrategyChoice {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::FormDb => "form-db",
            Self::Ldap => "ldap",
            Self::Oidc => "oidc",
        }
    }
}

impl fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as exposed to portal features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub enabled: bool,
}

impl UserInfo {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            enabled: true,
        }
    }
}

/// User search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Matched against user id and display name; `None` lists everyone.
    pub keyword: Option<String>,
    pub include_inactive: bool,
    pub offset: usize,
    pub limit: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            include_inactive: false,
            offset: 0,
            limit: 20,
        }
    }
}

impl UserQuery {
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    /// Trimmed keyword, `None` when blank.
    #[must_use]
    pub fn normalized_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Input for `create_or_update`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Raw password. Required when creating, optional when updating.
    pub password: Option<SecretString>,
    pub display_name: String,
    pub email: String,
    pub enabled: bool,
}

/// Interactive form credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Session liveness as reported by the heartbeat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartbeatStatus {
    Alive,
    Expired,
}

/// Where to send the browser once logout is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub redirect: String,
}

impl LogoutOutcome {
    #[must_use]
    pub fn redirect(target: impl Into<String>) -> Self {
        Self {
            redirect: target.into(),
        }
    }
}

/// Interactive login choice shown by the login picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOption {
    pub registration_id: String,
    pub client_name: String,
    pub authorization_uri: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HeartbeatStatus::Alive).unwrap(), "\"alive\"");
        assert_eq!(
            serde_json::to_string(&HeartbeatStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    #[test]
    fn blank_keyword_is_no_keyword() {
        assert_eq!(UserQuery::keyword("  ").normalized_keyword(), None);
        assert_eq!(UserQuery::keyword(" ann ").normalized_keyword(), Some("ann"));
    }

    #[test]
    fn user_info_uses_camel_case() {
        let json = serde_json::to_value(UserInfo::new("jdoe", "John", "j@example.com")).unwrap();
        assert_eq!(json["userId"], "jdoe");
        assert_eq!(json["enabled"], true);
    }
}
