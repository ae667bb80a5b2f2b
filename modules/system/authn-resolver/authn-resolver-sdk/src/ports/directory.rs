use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unreachable: {0}")]
    Unreachable(String),

    /// The server returned some entries before failing, e.g. on a referral it
    /// could not follow. The entries are usable.
    #[error("partial directory result ({} entries): {reason}", entries.len())]
    PartialResult {
        entries: Vec<DirectoryEntry>,
        reason: String,
    },

    #[error("invalid directory credentials")]
    InvalidCredentials,

    #[error("directory operation failed: {0}")]
    Other(String),
}

/// Search result entry: a distinguished name and its attributes.
///
/// Attribute names are compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.attributes
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Minimal directory access used by the LDAP strategy.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Open and authenticate the manager connection.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Unreachable`] when the server cannot be contacted.
    async fn check_connection(&self) -> Result<(), DirectoryError>;

    /// Subtree search under `base` with an RFC 4515 `filter`.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::PartialResult`] carries entries gathered before the failure.
    async fn search(&self, base: &str, filter: &str) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// Authenticate as `dn`.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::InvalidCredentials`] when the bind is refused.
    async fn bind(&self, dn: &str, password: &SecretString) -> Result<(), DirectoryError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup_ignores_case() {
        let entry = DirectoryEntry::new("uid=jdoe,ou=people,dc=example,dc=org")
            .with_attribute("uid", ["jdoe"])
            .with_attribute("memberOf", ["cn=a", "cn=b"]);

        assert_eq!(entry.first("UID"), Some("jdoe"));
        assert_eq!(entry.values("memberof").len(), 2);
        assert!(entry.values("mail").is_empty());
    }

    #[test]
    fn partial_result_reports_entry_count() {
        let err = DirectoryError::PartialResult {
            entries: vec![DirectoryEntry::new("cn=x")],
            reason: "referral".to_owned(),
        };
        assert_eq!(err.to_string(), "partial directory result (1 entries): referral");
    }
}
