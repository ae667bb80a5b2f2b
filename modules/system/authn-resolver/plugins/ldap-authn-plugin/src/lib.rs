//! Form login bound against a directory server.
//!
//! The user is located with a search filter (optionally restricted to the
//! members of a group), then authenticated by binding as the found entry.
//! The directory owns the users; the portal only reads them.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{LdapAuthnPluginConfig, LdapGroupConfig, LdapMappingConfig};
pub use infra::{InMemoryDirectory, LdapDirectory};
pub use module::LdapAuthnPlugin;
