use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher configured with the deployment's work factor
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    fn new_user(
        &self,
        command: RegisterUserCommand,
        role_id: &str,
        is_active: bool,
    ) -> Result<User, UserError> {
        let password_hash = self.password_hasher.hash(command.password.as_str())?;

        Ok(User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            profile: command.profile,
            role_id: role_id.to_string(),
            is_active,
            last_login: None,
            created_at: Utc::now(),
            updated_at: None,
            deactivated_at: None,
        })
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let user = self.new_user(command, User::DEFAULT_ROLE, false)?;
        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.password_hasher.hash(new_password.as_str())?;
        }

        if let Some(first_name) = command.first_name {
            user.profile.first_name = first_name;
        }

        if let Some(last_name) = command.last_name {
            user.profile.last_name = last_name;
        }

        if let Some(cpf) = command.cpf {
            user.profile.cpf = cpf;
        }

        if let Some(phone) = command.phone {
            user.profile.phone = phone;
        }

        user.updated_at = Some(Utc::now());

        self.repository.update(user).await
    }

    async fn deactivate_user(&self, id: &UserId) -> Result<User, UserError> {
        let user = self.repository.set_active(id, false, Utc::now()).await?;
        tracing::info!(user_id = %id, "User deactivated");
        Ok(user)
    }

    async fn activate_user(&self, id: &UserId) -> Result<User, UserError> {
        let user = self.repository.set_active(id, true, Utc::now()).await?;
        tracing::info!(user_id = %id, "User activated");
        Ok(user)
    }

    async fn ensure_bootstrap_user(
        &self,
        command: RegisterUserCommand,
    ) -> Result<Option<User>, UserError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let user = self.new_user(command, User::ADMIN_ROLE, true)?;
        self.repository.create(user).await.map(Some)
    }
}
