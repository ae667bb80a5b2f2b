//! Configuration entries and resolved snapshots.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the server-wide cluster scope.
pub const CLUSTER_NAME_DEFAULT: &str = "default";

/// A single key/value override as stored by the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub cluster: String,
}

impl ConfigEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            cluster: cluster.into(),
        }
    }

    /// Entries without a key carry nothing to apply.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.key.trim().is_empty()
    }
}

/// Resolved configuration snapshot.
///
/// Built wholesale by [`crate::resolve`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    values: BTreeMap<String, String>,
}

impl EffectiveConfig {
    pub(crate) fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Parse a value; `None` when the key is absent or does not parse.
    #[must_use]
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|raw| raw.trim().parse().ok())
    }

    /// Comma separated value split into trimmed, non-empty items.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A key whose resolved value is new or differs from the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub key: String,
    pub value: String,
    pub previous: Option<String>,
}
