//! API Gateway Module
//!
//! Turns the active strategy's capability bundle into an HTTP surface: an
//! ordered authorization chain enforced by middleware, the session login
//! and logout endpoints, and the identity and heartbeat routes.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ant;
pub mod auth;
pub mod chain;
pub mod config;
pub mod module;
pub mod routes;

pub use auth::{GatewayState, SessionCookie};
pub use chain::{AuthorizationChain, AuthorizationChainBuilder, BY_PASS_URLS, ChainError};
pub use config::ApiGatewayConfig;
pub use module::{build_router, gateway_state, serve};
pub use routes::complete_federated_login;
