//! Form login backed by the portal's own user store.
//!
//! Users and their authorities live in a relational store reached through
//! [`authn_resolver_sdk::ports::UserStore`]. Every page except the bypass
//! list and the login surface requires the `user` role.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::FormDbAuthnPluginConfig;
pub use module::FormDbAuthnPlugin;
