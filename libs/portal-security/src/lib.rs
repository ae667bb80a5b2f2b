#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod context;
pub mod identity;
pub mod principal;
pub mod session;

pub use context::{SecurityContext, SecurityContextBuilder};
pub use identity::{ANONYMOUS_PRINCIPAL_ID, BackendIdentity};
pub use principal::{BearerPrincipal, FederatedPrincipal, LocalPrincipal, Principal, ROLE_PREFIX};
pub use session::{InMemorySessionStore, SessionId, SessionStore};
