use serde::Deserialize;
use serde::Serialize;

/// Claims carried by both access and refresh tokens.
///
/// `exp` and `iat` are injected by the codec at issuance; any value set by
/// the caller is overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role_id: String,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create claims for a user without any timestamps.
    pub fn new(
        user_id: impl ToString,
        username: impl Into<String>,
        email: impl Into<String>,
        role_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.into(),
            email: email.into(),
            role_id: role_id.into(),
            exp: None,
            iat: None,
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Check whether the token is expired at `current_timestamp`.
    ///
    /// A token is expired from the second named by `exp` onwards. Claims
    /// without `exp` are treated as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(true, |exp| exp <= current_timestamp)
    }

    /// The user-identifying part of the claims, stripped of timestamps.
    pub fn payload(&self) -> Self {
        Self {
            exp: None,
            iat: None,
            ..self.clone()
        }
    }
}
