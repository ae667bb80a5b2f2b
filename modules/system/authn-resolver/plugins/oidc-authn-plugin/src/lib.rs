//! Federated login through OpenID Connect client registrations.
//!
//! The authorization-code handshake itself happens outside this crate; the
//! strategy completes it by mirroring the user into the local store and
//! issuing a session principal. With an issuer configured it also accepts
//! bearer JWTs as a resource server.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{ClientRegistration, GrantType, OidcAuthnPluginConfig, ResourceServerConfig};
pub use module::{OAUTH2_CALLBACK_PATTERN, OidcAuthnPlugin};
