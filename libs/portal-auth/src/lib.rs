#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

// Core modules
pub mod errors;
pub mod traits;

// JWT infrastructure
pub mod claims_error;
pub mod config;
pub mod providers;
pub mod validation;
pub mod validator;

// Core exports
pub use errors::AuthError;
pub use traits::{KeyProvider, TokenValidator};

// JWT exports
pub use claims_error::ClaimsError;
pub use config::JwtConfig;
pub use providers::StaticKeyProvider;
pub use validation::{ValidationConfig, validate_claims};
pub use validator::JwtBearerValidator;
