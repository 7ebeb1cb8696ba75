//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the account service:
//! - Password hashing (Argon2id, configurable work factor)
//! - Access/refresh token issuance and validation with independent secrets
//! - Authentication coordination
//!
//! The crate knows nothing about HTTP or storage; services adapt it.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Claims, TokenCodec, TokenKind, TokenSettings};
//!
//! let codec = TokenCodec::new(&TokenSettings {
//!     access_secret: "access_secret_key_at_least_32_bytes!".to_string(),
//!     refresh_secret: "refresh_secret_key_at_least_32_bytes!".to_string(),
//!     algorithm: "HS256".to_string(),
//!     access_ttl_minutes: 15,
//!     refresh_ttl_minutes: 1440,
//! })
//! .unwrap();
//!
//! let claims = Claims::new("user123", "alice", "alice@example.com", "user");
//! let token = codec.issue_access(&claims).unwrap();
//! let decoded = codec.decode(&token, TokenKind::Access).unwrap();
//! assert_eq!(decoded.username, "alice");
//! assert!(codec.decode(&token, TokenKind::Refresh).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use jwt::TokenSettings;
pub use password::PasswordError;
pub use password::PasswordHasher;
