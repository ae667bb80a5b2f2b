use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Encodes and checks stored passwords.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &SecretString) -> SecretString;

    fn matches(&self, raw: &SecretString, encoded: &SecretString) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// Stored as-is. Development only.
    Noop,
    /// Hex encoded SHA-256 digest.
    Sha256,
}

impl PasswordScheme {
    const fn id(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Sha256 => "sha256",
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        match id {
            "noop" => Some(Self::Noop),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    fn digest(self, raw: &str) -> String {
        match self {
            Self::Noop => raw.to_owned(),
            Self::Sha256 => hex::encode(Sha256::digest(raw.as_bytes())),
        }
    }
}

/// Reads the `{id}` prefix of a stored hash and dispatches to that scheme.
///
/// New passwords are encoded with the configured default scheme.
#[derive(Debug, Clone, Copy)]
pub struct DelegatingPasswordEncoder {
    default_scheme: PasswordScheme,
}

impl Default for DelegatingPasswordEncoder {
    fn default() -> Self {
        Self::new(PasswordScheme::Sha256)
    }
}

impl DelegatingPasswordEncoder {
    #[must_use]
    pub const fn new(default_scheme: PasswordScheme) -> Self {
        Self { default_scheme }
    }
}

fn split_scheme(encoded: &str) -> Option<(&str, &str)> {
    let rest = encoded.strip_prefix('{')?;
    rest.split_once('}')
}

impl PasswordEncoder for DelegatingPasswordEncoder {
    fn encode(&self, raw: &SecretString) -> SecretString {
        let scheme = self.default_scheme;
        SecretString::from(format!(
            "{{{}}}{}",
            scheme.id(),
            scheme.digest(raw.expose_secret())
        ))
    }

    fn matches(&self, raw: &SecretString, encoded: &SecretString) -> bool {
        let Some((id, hash)) = split_scheme(encoded.expose_secret()) else {
            tracing::debug!("stored password has no scheme prefix");
            return false;
        };
        let Some(scheme) = PasswordScheme::from_id(id) else {
            tracing::debug!(scheme = id, "unsupported password scheme");
            return false;
        };
        scheme.digest(raw.expose_secret()) == hash
    }
}
