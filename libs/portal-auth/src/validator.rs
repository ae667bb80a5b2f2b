use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;

use crate::claims_error::ClaimsError;
use crate::errors::AuthError;
use crate::traits::{KeyProvider, TokenValidator};
use crate::validation::{ValidationConfig, validate_claims};

/// Resource-server token validator: signature via a [`KeyProvider`], then standard claims.
pub struct JwtBearerValidator {
    provider: Arc<dyn KeyProvider>,
    config: ValidationConfig,
}

impl JwtBearerValidator {
    #[must_use]
    pub fn new(provider: Arc<dyn KeyProvider>, config: ValidationConfig) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl TokenValidator for JwtBearerValidator {
    async fn validate_and_parse(&self, token: &str) -> Result<Value, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }

        let (_, claims) = self.provider.validate_and_decode(token).await.map_err(|e| {
            tracing::debug!(provider = self.provider.name(), error = %e, "bearer token rejected");
            e
        })?;
        validate_claims(&claims, &self.config, OffsetDateTime::now_utc())?;

        if claims.get("sub").and_then(Value::as_str).is_none() {
            return Err(ClaimsError::MissingClaim("sub".to_owned()).into());
        }
        Ok(claims)
    }
}
