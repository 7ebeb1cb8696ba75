use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new, inactive user.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Retrieve all users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Apply a partial update and stamp `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Mark the user inactive. Existing tokens stay valid until they expire,
    /// but login and gated refresh are refused from now on.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn deactivate_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Mark the user active.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn activate_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Create an active user with the admin role unless the username is taken.
    ///
    /// # Returns
    /// `Some(user)` when a user was created, `None` when it already existed
    async fn ensure_bootstrap_user(
        &self,
        command: RegisterUserCommand,
    ) -> Result<Option<User>, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Set the active flag in a single atomic update.
    ///
    /// Deactivation stamps `deactivated_at`; activation clears it. Both stamp
    /// `updated_at` with `at`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn set_active(
        &self,
        id: &UserId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> Result<User, UserError>;

    /// Stamp `last_login` in a single atomic update.
    async fn record_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;
}
