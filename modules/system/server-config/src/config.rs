use std::time::Duration;

use serde::Deserialize;

/// Server config source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfigSettings {
    /// Data center this process runs in; blank disables the data-center tier.
    pub data_center: String,
    /// Explicit cluster override; blank or absent disables the tier.
    pub cluster: Option<String>,
    /// Seconds between background refreshes.
    pub refresh_interval_secs: u64,
}

impl Default for ServerConfigSettings {
    fn default() -> Self {
        Self {
            data_center: String::new(),
            cluster: None,
            refresh_interval_secs: 60,
        }
    }
}

impl ServerConfigSettings {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
