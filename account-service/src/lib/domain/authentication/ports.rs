use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::LoginCommand;

/// Port for sign-in and token renewal.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Check credentials and issue an access/refresh token pair.
    ///
    /// Checks run in a fixed order: the user must exist, then be active, and
    /// only then is the password verified.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this username
    /// * `InactiveUser` - User exists but is deactivated
    /// * `InvalidCredentials` - Password does not match
    /// * `CorruptCredential` - Stored hash is malformed
    async fn login(&self, command: LoginCommand) -> Result<auth::TokenPair, AuthError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// * `ExpiredToken` / `InvalidToken` - Refresh token is unusable
    /// * `InactiveUser` - User was deactivated (when gating is enabled)
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;
}
