//! AuthN Resolver SDK
//!
//! Public API of the `authn_resolver` module and the contract its strategy
//! plugins implement:
//!
//! - [`AuthnStrategyPlugin`] - implemented by each strategy (default, form-db, ldap, oidc)
//! - [`CapabilityBundle`] - what a strategy produces: identity, users, logout, heartbeat
//!   and the chain policy the gateway turns into an authorization chain
//! - [`Collaborators`] - infrastructure ports handed to the strategy at startup
//! - [`AuthnError`], [`StartupError`] - request-time and startup failures
//!
//! ## Usage
//!
//! ```ignore
//! use authn_resolver_sdk::{Collaborators, StrategyChoice};
//!
//! let bundle = plugin.build(&collaborators).await?;
//! let identity = bundle.identity_holder.current_identity(&ctx).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod bundle;
pub mod chain;
pub mod collaborators;
pub mod error;
pub mod handlers;
pub mod models;
pub mod plugin_api;
pub mod ports;

// Re-export main types at crate root
pub use api::{
    AuthenticationProvider, FederatedLoginHandler, HeartbeatHandler, IdentityHolder, LogoutHandler,
    UserService,
};
pub use bundle::CapabilityBundle;
pub use chain::{AuthorizationRule, ChainPolicy, EntryPoint, LoginSurface, Requirement};
pub use collaborators::Collaborators;
pub use error::{AuthnError, StartupError};
pub use models::{
    Credentials, HeartbeatStatus, LoginOption, LogoutOutcome, NewUser, StrategyChoice, UserInfo,
    UserQuery,
};
pub use plugin_api::AuthnStrategyPlugin;
