use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),

    /// The stored hash could not be parsed or carries unusable parameters.
    #[error("Stored password hash is corrupt: {0}")]
    CorruptHash(String),
}
