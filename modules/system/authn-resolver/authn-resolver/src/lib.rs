//! AuthN resolver module
//!
//! Reads the activation signal once at startup, picks exactly one
//! authentication strategy plugin and builds its capability bundle. The
//! bundle is installed only when every capability the strategy needs is
//! present; any failure aborts startup.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::AuthnResolverConfig;
pub use domain::{Service, select};
pub use module::AuthnResolver;
