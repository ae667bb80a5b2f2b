//! Domain layer for the default strategy.

pub mod service;

pub use service::{AlwaysAliveHeartbeat, AnonymousIdentityHolder, AnonymousUserService, RedirectLogoutHandler};
