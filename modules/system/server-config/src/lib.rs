//! Server configuration overrides resolved across tiers.
//!
//! Entries scoped to the `default` cluster apply everywhere, then entries for
//! the local data center, then entries for an explicitly configured cluster.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

pub mod config;
pub mod memory;
pub mod model;
pub mod refresh;
pub mod resolver;
pub mod source;

pub use config::ServerConfigSettings;
pub use memory::InMemoryServerConfigRepository;
pub use model::{CLUSTER_NAME_DEFAULT, ConfigChange, ConfigEntry, EffectiveConfig};
pub use refresh::spawn_refresh_task;
pub use resolver::{AUDIT_TARGET, resolve};
pub use source::{ConfigSourceError, RefreshOutcome, RefreshableConfigSource, ServerConfigRepository};
