//! Tier cascade: server-wide defaults, then the data center, then an explicit cluster.

use std::collections::BTreeMap;

use crate::model::{CLUSTER_NAME_DEFAULT, ConfigChange, ConfigEntry, EffectiveConfig};

/// Tracing target for configuration audit records.
pub const AUDIT_TARGET: &str = "server_config::audit";

/// Merge `entries` into one snapshot.
///
/// Later tiers overwrite earlier ones for the same key. Entries whose cluster
/// matches no tier are ignored. A blank `explicit_cluster` counts as absent.
#[must_use]
pub fn resolve(
    entries: &[ConfigEntry],
    data_center: &str,
    explicit_cluster: Option<&str>,
) -> EffectiveConfig {
    let mut values = BTreeMap::new();

    apply_tier(&mut values, entries, CLUSTER_NAME_DEFAULT);
    apply_tier(&mut values, entries, data_center);
    if let Some(cluster) = explicit_cluster.map(str::trim)
        && !cluster.is_empty()
    {
        apply_tier(&mut values, entries, cluster);
    }

    EffectiveConfig::from_map(values)
}

fn apply_tier(values: &mut BTreeMap<String, String>, entries: &[ConfigEntry], cluster: &str) {
    if cluster.is_empty() {
        return;
    }
    for entry in entries.iter().filter(|e| e.cluster == cluster) {
        if entry.is_malformed() {
            tracing::debug!(cluster, "skipping config entry without key");
            continue;
        }
        values.insert(entry.key.clone(), entry.value.clone());
    }
}

/// Keys that are new in `next` or whose value differs from `previous`.
#[must_use]
pub fn diff(previous: &EffectiveConfig, next: &EffectiveConfig) -> Vec<ConfigChange> {
    next.iter()
        .filter_map(|(key, value)| match previous.get(key) {
            Some(old) if old == value => None,
            old => Some(ConfigChange {
                key: key.to_owned(),
                value: value.to_owned(),
                previous: old.map(str::to_owned),
            }),
        })
        .collect()
}

/// Keys present in `previous` and gone from `next`.
#[must_use]
pub fn removed_keys(previous: &EffectiveConfig, next: &EffectiveConfig) -> Vec<String> {
    previous
        .iter()
        .filter(|(key, _)| !next.contains_key(key))
        .map(|(key, _)| key.to_owned())
        .collect()
}

/// Emit one audit record per change.
pub fn audit(changes: &[ConfigChange]) {
    for change in changes {
        match &change.previous {
            None => tracing::info!(
                target: AUDIT_TARGET,
                key = %change.key,
                value = %change.value,
                "load config from store"
            ),
            Some(previous) => tracing::info!(
                target: AUDIT_TARGET,
                key = %change.key,
                value = %change.value,
                previous = %previous,
                "config changed"
            ),
        }
    }
}
