use thiserror::Error;

use crate::user::errors::UserError;

/// Errors produced by login, refresh and the route guard.
///
/// Every variant is terminal for the request; none is retried.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is inactive")]
    InactiveUser,

    #[error("Token is expired")]
    ExpiredToken,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Invalid Authorization header format. Expected: Bearer <token>")]
    MalformedCredential,

    /// The stored password hash is malformed. Data-integrity problem.
    #[error("Stored credential is corrupt: {0}")]
    CorruptCredential(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("User store error: {0}")]
    Store(#[from] UserError),
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => AuthError::ExpiredToken,
            auth::JwtError::InvalidToken(reason) => AuthError::InvalidToken(reason),
            auth::JwtError::EncodingFailed(reason)
            | auth::JwtError::InvalidConfiguration(reason) => AuthError::TokenIssuance(reason),
        }
    }
}

impl From<auth::AuthenticationError> for AuthError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            auth::AuthenticationError::PasswordError(e) => {
                AuthError::CorruptCredential(e.to_string())
            }
            auth::AuthenticationError::JwtError(e) => AuthError::from(e),
        }
    }
}
