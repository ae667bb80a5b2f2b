use crate::{claims_error::ClaimsError, errors::AuthError};
use async_trait::async_trait;
use jsonwebtoken::Header;
use serde_json::Value;

/// Validates bearer tokens presented to the resource server
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a JWT token and return its claims as JSON
    async fn validate_and_parse(&self, token: &str) -> Result<Value, AuthError>;
}

/// Provider that can verify JWT signatures and decode tokens
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Returns the name of this provider (for debugging/logging)
    fn name(&self) -> &str;

    /// Verify the JWT signature and decode its header and claims
    ///
    /// Returns the JWT header and raw claims as JSON if the signature is valid.
    /// Claim checks (issuer, expiry, audience) are done by the caller.
    async fn validate_and_decode(&self, token: &str) -> Result<(Header, Value), ClaimsError>;
}
