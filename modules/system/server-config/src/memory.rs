use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::ConfigEntry;
use crate::source::{ConfigSourceError, ServerConfigRepository};

/// Process-local entry store for development setups and tests.
#[derive(Default)]
pub struct InMemoryServerConfigRepository {
    entries: RwLock<Vec<ConfigEntry>>,
}

impl InMemoryServerConfigRepository {
    #[must_use]
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn replace(&self, entries: Vec<ConfigEntry>) {
        *self.entries.write() = entries;
    }

    /// Insert or overwrite the entry with the same key and cluster.
    pub fn upsert(&self, entry: ConfigEntry) {
        let mut entries = self.entries.write();
        match entries
            .iter_mut()
            .find(|e| e.key == entry.key && e.cluster == entry.cluster)
        {
            Some(existing) => existing.value = entry.value,
            None => entries.push(entry),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ServerConfigRepository for InMemoryServerConfigRepository {
    async fn find_all(&self) -> Result<Vec<ConfigEntry>, ConfigSourceError> {
        Ok(self.entries.read().clone())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_same_key_and_cluster() {
        let repo = InMemoryServerConfigRepository::default();
        repo.upsert(ConfigEntry::new("x", "1", "default"));
        repo.upsert(ConfigEntry::new("x", "2", "dc"));
        repo.upsert(ConfigEntry::new("x", "3", "default"));

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "3");
        assert_eq!(all[1].value, "2");
    }
}
