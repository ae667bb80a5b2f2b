use thiserror::Error;

use crate::claims_error::ClaimsError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error("Internal error: {0}")]
    Internal(String),
}
