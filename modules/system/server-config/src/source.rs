use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::{ConfigEntry, EffectiveConfig};
use crate::resolver::{audit, diff, removed_keys, resolve};

#[derive(Debug, thiserror::Error)]
pub enum ConfigSourceError {
    #[error("server config repository failed: {0}")]
    Repository(String),
}

/// Read access to the persisted config entries.
#[async_trait]
pub trait ServerConfigRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<ConfigEntry>, ConfigSourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was published; `changed` keys were audited.
    Refreshed { changed: usize },
    /// Another refresh was in flight; nothing was done.
    AlreadyRunning,
}

/// Holds the current [`EffectiveConfig`] and rebuilds it on demand.
///
/// Readers get `Arc` snapshots that stay valid while a refresh swaps in a new one.
pub struct RefreshableConfigSource {
    repository: Arc<dyn ServerConfigRepository>,
    data_center: String,
    explicit_cluster: Option<String>,
    current: ArcSwap<EffectiveConfig>,
    refresh_lock: Mutex<()>,
}

impl RefreshableConfigSource {
    #[must_use]
    pub fn new(
        repository: Arc<dyn ServerConfigRepository>,
        data_center: impl Into<String>,
        explicit_cluster: Option<String>,
    ) -> Self {
        Self {
            repository,
            data_center: data_center.into(),
            explicit_cluster: explicit_cluster.filter(|c| !c.trim().is_empty()),
            current: ArcSwap::from_pointee(EffectiveConfig::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<EffectiveConfig> {
        self.current.load_full()
    }

    #[must_use]
    pub fn data_center(&self) -> &str {
        &self.data_center
    }

    #[must_use]
    pub fn explicit_cluster(&self) -> Option<&str> {
        self.explicit_cluster.as_deref()
    }

    /// Rebuild the snapshot from the repository.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigSourceError`] when the repository read fails; the
    /// previous snapshot stays published.
    #[tracing::instrument(skip_all, fields(data_center = %self.data_center))]
    pub async fn refresh(&self) -> Result<RefreshOutcome, ConfigSourceError> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            tracing::debug!("config refresh already in flight");
            return Ok(RefreshOutcome::AlreadyRunning);
        };

        let entries = self.repository.find_all().await?;
        let next = resolve(&entries, &self.data_center, self.explicit_cluster.as_deref());

        let previous = self.current.load();
        let changes = diff(&previous, &next);
        audit(&changes);
        for key in removed_keys(&previous, &next) {
            tracing::debug!(key = %key, "config key removed");
        }

        self.current.store(Arc::new(next));
        Ok(RefreshOutcome::Refreshed {
            changed: changes.len(),
        })
    }
}
