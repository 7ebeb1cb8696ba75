use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenKind;
use crate::jwt::TokenSettings;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token
/// issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Access and refresh token issued together on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub const TOKEN_TYPE: &'static str = "bearer";
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher used for new credentials and verification
    /// * `settings` - Token signing configuration
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Token settings are unusable
    pub fn new(password_hasher: PasswordHasher, settings: &TokenSettings) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher,
            token_codec: TokenCodec::new(settings)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claims` - Claims to encode in both tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is corrupt
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &Claims,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token_pair(claims)?)
    }

    /// Issue an access/refresh token pair without password verification.
    pub fn issue_token_pair(&self, claims: &Claims) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.token_codec.issue_access(claims)?,
            refresh_token: self.token_codec.issue_refresh(claims)?,
            token_type: TokenPair::TOKEN_TYPE.to_string(),
        })
    }

    /// Issue a single access token, as done when refreshing.
    pub fn issue_access_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.token_codec.issue_access(claims)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_codec.decode(token, TokenKind::Access)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_codec.decode(token, TokenKind::Refresh)
    }
}
