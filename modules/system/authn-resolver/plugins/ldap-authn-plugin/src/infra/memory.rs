use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use authn_resolver_sdk::ports::{DirectoryClient, DirectoryEntry, DirectoryError};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::filter::Filter;

/// Directory kept in process memory, for development setups and tests.
pub struct InMemoryDirectory {
    entries: RwLock<Vec<DirectoryEntry>>,
    passwords: RwLock<HashMap<String, SecretString>>,
    reachable: AtomicBool,
    result_limit: RwLock<Option<usize>>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            passwords: RwLock::new(HashMap::new()),
            reachable: AtomicBool::new(true),
            result_limit: RwLock::new(None),
        }
    }
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&self, entry: DirectoryEntry) {
        self.entries.write().push(entry);
    }

    /// Add an entry that can be bound to with `password`.
    pub fn add_user(&self, entry: DirectoryEntry, password: SecretString) {
        self.passwords.write().insert(entry.dn.to_lowercase(), password);
        self.add_entry(entry);
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Cut searches returning more than `limit` entries short with a partial result.
    pub fn truncate_results(&self, limit: Option<usize>) {
        *self.result_limit.write() = limit;
    }

    fn ensure_reachable(&self) -> Result<(), DirectoryError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DirectoryError::Unreachable("connection refused".to_owned()))
        }
    }
}

fn under_base(dn: &str, base: &str) -> bool {
    let base = base.trim().to_lowercase();
    if base.is_empty() {
        return true;
    }
    let dn = dn.to_lowercase();
    dn == base || dn.ends_with(&format!(",{base}"))
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn check_connection(&self) -> Result<(), DirectoryError> {
        self.ensure_reachable()
    }

    async fn search(&self, base: &str, filter: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        self.ensure_reachable()?;
        let filter = Filter::parse(filter).map_err(|e| DirectoryError::Other(e.to_string()))?;

        let mut found: Vec<DirectoryEntry> = self
            .entries
            .read()
            .iter()
            .filter(|entry| under_base(&entry.dn, base) && filter.matches(entry))
            .cloned()
            .collect();

        if let Some(limit) = *self.result_limit.read()
            && found.len() > limit
        {
            found.truncate(limit);
            return Err(DirectoryError::PartialResult {
                entries: found,
                reason: "size limit exceeded".to_owned(),
            });
        }
        Ok(found)
    }

    async fn bind(&self, dn: &str, password: &SecretString) -> Result<(), DirectoryError> {
        self.ensure_reachable()?;
        let passwords = self.passwords.read();
        match passwords.get(&dn.to_lowercase()) {
            Some(stored) if stored.expose_secret() == password.expose_secret() => Ok(()),
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        let dir = InMemoryDirectory::new();
        dir.add_user(
            DirectoryEntry::new("uid=jdoe,ou=people,dc=example,dc=org").with_attribute("uid", ["jdoe"]),
            SecretString::from("pw"),
        );
        dir.add_entry(DirectoryEntry::new("uid=other,dc=elsewhere").with_attribute("uid", ["other"]));
        dir
    }

    #[tokio::test]
    async fn search_is_scoped_to_base() {
        let dir = directory();
        let found = dir.search("dc=example,dc=org", "(uid=*)").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(dir.search("", "(uid=*)").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bind_checks_password() {
        let dir = directory();
        let dn = "UID=jdoe,ou=people,dc=example,dc=org";
        dir.bind(dn, &SecretString::from("pw")).await.unwrap();
        let err = dir.bind(dn, &SecretString::from("nope")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unreachable_directory_fails_everything() {
        let dir = directory();
        dir.set_reachable(false);
        assert!(matches!(
            dir.check_connection().await,
            Err(DirectoryError::Unreachable(_))
        ));
        assert!(matches!(
            dir.search("", "(uid=*)").await,
            Err(DirectoryError::Unreachable(_))
        ));
    }
}
