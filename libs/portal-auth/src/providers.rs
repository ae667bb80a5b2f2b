//! Key providers backed by locally configured key material.

use std::collections::HashSet;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::claims_error::ClaimsError;
use crate::traits::KeyProvider;

/// Verifies signatures with a single configured key.
pub struct StaticKeyProvider {
    name: String,
    key: DecodingKey,
    algorithm: Algorithm,
}

impl StaticKeyProvider {
    /// HMAC-SHA256 shared secret.
    #[must_use]
    pub fn hmac(name: impl Into<String>, secret: &SecretString) -> Self {
        Self {
            name: name.into(),
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    /// RSA public key in PEM form, RS256 signatures.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimsError::InvalidKey`] if the PEM cannot be parsed.
    pub fn rsa_pem(name: impl Into<String>, pem: &str) -> Result<Self, ClaimsError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ClaimsError::InvalidKey(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            key,
            algorithm: Algorithm::RS256,
        })
    }

    fn validation(&self) -> Validation {
        // Claims are checked by `validate_claims`; only the signature is verified here.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate_and_decode(&self, token: &str) -> Result<(Header, Value), ClaimsError> {
        let header =
            jsonwebtoken::decode_header(token).map_err(|e| ClaimsError::DecodeFailed(e.to_string()))?;
        if header.alg != self.algorithm {
            return Err(ClaimsError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let data = jsonwebtoken::decode::<Value>(token, &self.key, &self.validation()).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => ClaimsError::InvalidSignature,
                _ => ClaimsError::DecodeFailed(e.to_string()),
            },
        )?;

        Ok((data.header, data.claims))
    }
}
