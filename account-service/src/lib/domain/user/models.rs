use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// `password_hash` holds the Argon2 PHC string and is never serialized into
/// responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub profile: Profile,
    pub role_id: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Role assigned to self-registered users.
    pub const DEFAULT_ROLE: &'static str = "user";

    /// Role assigned to the bootstrap account.
    pub const ADMIN_ROLE: &'static str = "admin";
}

/// Personal details stored alongside the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub phone: String,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.len();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that satisfies the complexity policy.
///
/// Only lives long enough to be hashed; `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const SPECIAL_CHARACTERS: [char; 7] = ['@', '#', '$', '%', '&', '*', '!'];

    /// Validate a plaintext password against the complexity policy.
    ///
    /// Every violated rule is reported, not just the first one.
    ///
    /// # Errors
    /// * `Violations` - One or more rules are not met
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let mut violations = Vec::new();

        if password.chars().count() < Self::MIN_LENGTH {
            violations.push(format!(
                "The password must contain at least {} characters",
                Self::MIN_LENGTH
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push("The password must contain at least one digit".to_string());
        }

        if !password.chars().any(char::is_uppercase) {
            violations
                .push("The password must contain at least one uppercase letter".to_string());
        }

        if !password.chars().any(char::is_lowercase) {
            violations
                .push("The password must contain at least one lowercase letter".to_string());
        }

        if !password
            .chars()
            .any(|c| Self::SPECIAL_CHARACTERS.contains(&c))
        {
            violations
                .push("The password must contain at least one special character".to_string());
        }

        if violations.is_empty() {
            Ok(Self(password))
        } else {
            Err(PasswordPolicyError::Violations(violations))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub profile: Profile,
}

impl RegisterUserCommand {
    pub fn new(
        username: Username,
        email: EmailAddress,
        password: Password,
        profile: Profile,
    ) -> Self {
        Self {
            username,
            email,
            password,
            profile,
        }
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(Username::new("alice".to_string()).is_ok());
        assert_eq!(
            Username::new("al".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
        assert_eq!(
            Username::new("a".repeat(33)),
            Err(UsernameError::TooLong {
                max: 32,
                actual: 33
            })
        );
        assert_eq!(
            Username::new("alice smith".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_email_rules() {
        assert!(EmailAddress::new("alice@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_password_accepts_complex_password() {
        assert!(Password::new("Correct1!".to_string()).is_ok());
    }

    #[test]
    fn test_password_reports_every_violation() {
        let err = Password::new("abc".to_string()).unwrap_err();
        let PasswordPolicyError::Violations(violations) = &err;

        assert_eq!(violations.len(), 4);
        let message = err.to_string();
        assert!(message.contains("at least 8 characters"));
        assert!(message.contains("one digit"));
        assert!(message.contains("uppercase"));
        assert!(message.contains("special character"));
        assert!(!message.contains("lowercase"));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("Correct1!".to_string()).unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");
    }
}
