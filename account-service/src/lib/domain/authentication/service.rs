use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::ports::UserRepository;

/// Login and refresh flows over the user store.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    gate_refresh_on_active_status: bool,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service.
    ///
    /// # Arguments
    /// * `repository` - User store used for lookups and last-login stamping
    /// * `authenticator` - Password verification and token issuance
    /// * `gate_refresh_on_active_status` - Re-check `is_active` on refresh
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        gate_refresh_on_active_status: bool,
    ) -> Self {
        Self {
            repository,
            authenticator,
            gate_refresh_on_active_status,
        }
    }

    async fn ensure_still_active(&self, claims: &auth::Claims) -> Result<(), AuthError> {
        let user_id = UserId::from_string(&claims.user_id)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("token subject no longer exists".to_string()))?;

        if !user.is_active {
            tracing::info!(user_id = %user_id, "Refresh refused for inactive user");
            return Err(AuthError::InactiveUser);
        }

        Ok(())
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<auth::TokenPair, AuthError> {
        // A name that fails validation cannot belong to any stored user.
        let username = Username::new(command.username).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login refused for inactive user");
            return Err(AuthError::InactiveUser);
        }

        let claims = auth::Claims::from(&user);

        let tokens = self
            .authenticator
            .authenticate(&command.password, &user.password_hash, &claims)
            .map_err(|e| {
                let e = AuthError::from(e);
                if let AuthError::CorruptCredential(reason) = &e {
                    tracing::error!(
                        user_id = %user.id,
                        reason = %reason,
                        "Stored password hash is corrupt"
                    );
                }
                e
            })?;

        if let Err(e) = self
            .repository
            .record_last_login(&user.id, Utc::now())
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .authenticator
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token validation failed");
                AuthError::from(e)
            })?;

        if self.gate_refresh_on_active_status {
            self.ensure_still_active(&claims).await?;
        }

        Ok(self.authenticator.issue_access_token(&claims)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Profile;
    use crate::domain::user::models::User;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn set_active(&self, id: &UserId, is_active: bool, at: DateTime<Utc>) -> Result<User, UserError>;
            async fn record_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;
        }
    }

    fn hasher() -> auth::PasswordHasher {
        auth::PasswordHasher::with_params(8 * 1024, 1, 1).unwrap()
    }

    fn authenticator() -> Arc<Authenticator> {
        let settings = auth::TokenSettings {
            access_secret: "test_access_secret_at_least_32_bytes!".to_string(),
            refresh_secret: "test_refresh_secret_at_least_32_bytes!".to_string(),
            algorithm: "HS256".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_minutes: 120,
        };
        Arc::new(Authenticator::new(hasher(), &settings).unwrap())
    }

    fn alice(password_hash: String, is_active: bool) -> User {
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            password_hash,
            profile: Profile {
                first_name: "Alice".to_string(),
                last_name: "Liddell".to_string(),
                cpf: "12345678909".to_string(),
                phone: "+5511999999999".to_string(),
            },
            role_id: "user".to_string(),
            is_active,
            last_login: None,
            created_at: Utc::now(),
            updated_at: None,
            deactivated_at: None,
        }
    }

    fn repository_with(user: User) -> MockTestUserRepository {
        let mut repository = MockTestUserRepository::new();
        let by_username = user.clone();
        repository
            .expect_find_by_username()
            .returning(move |_| Ok(Some(by_username.clone())));
        let by_id = user;
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        repository
    }

    #[tokio::test]
    async fn test_login_success_issues_tokens_and_stamps_last_login() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let user_id = user.id;
        let mut repository = repository_with(user);
        repository
            .expect_record_last_login()
            .with(eq(user_id), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let authenticator = authenticator();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), true);

        let tokens = service
            .login(LoginCommand::new("alice", "Correct1!"))
            .await
            .expect("login failed");

        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        assert_ne!(tokens.access_token, tokens.refresh_token);
        assert_eq!(tokens.token_type, "bearer");

        let claims = authenticator
            .validate_access_token(&tokens.access_token)
            .unwrap();
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role_id, "user");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let mut repository = repository_with(user);
        repository.expect_record_last_login().times(0);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("alice", "wrong")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_record_last_login().times(0);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("bob", "Correct1!")).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_login_malformed_username_is_not_found_without_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("a b", "Correct1!")).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_login_inactive_user_with_correct_password() {
        let user = alice(hasher().hash("Correct1!").unwrap(), false);
        let mut repository = repository_with(user);
        repository.expect_record_last_login().times(0);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("alice", "Correct1!")).await;
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_login_checks_active_status_before_password() {
        // A corrupt hash would fail verification; an inactive user never gets there.
        let user = alice("not-a-phc-string".to_string(), false);
        let repository = repository_with(user);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("alice", "wrong")).await;
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_login_corrupt_hash_fails_closed() {
        let user = alice("not-a-phc-string".to_string(), true);
        let mut repository = repository_with(user);
        repository.expect_record_last_login().times(0);

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("alice", "Correct1!")).await;
        assert!(matches!(result, Err(AuthError::CorruptCredential(_))));
    }

    #[tokio::test]
    async fn test_login_succeeds_when_last_login_stamp_fails() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let mut repository = repository_with(user);
        repository
            .expect_record_last_login()
            .times(1)
            .returning(|_, _| Err(UserError::DatabaseError("connection reset".to_string())));

        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.login(LoginCommand::new("alice", "Correct1!")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let claims = auth::Claims::from(&user);
        let repository = repository_with(user);

        let authenticator = authenticator();
        let pair = authenticator.issue_token_pair(&claims).unwrap();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), true);

        let access_token = service.refresh(&pair.refresh_token).await.unwrap();

        let decoded = authenticator.validate_access_token(&access_token).unwrap();
        assert_eq!(decoded.payload(), claims);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let claims = auth::Claims::from(&user);
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let authenticator = authenticator();
        let pair = authenticator.issue_token_pair(&claims).unwrap();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), true);

        let result = service.refresh(&pair.access_token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage() {
        let repository = MockTestUserRepository::new();
        let service = AuthService::new(Arc::new(repository), authenticator(), true);

        let result = service.refresh("invalid.token.here").await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_refresh_gated_rejects_deactivated_user() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let claims = auth::Claims::from(&user);
        let mut deactivated = user;
        deactivated.is_active = false;
        let repository = repository_with(deactivated);

        let authenticator = authenticator();
        let pair = authenticator.issue_token_pair(&claims).unwrap();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), true);

        let result = service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_refresh_ungated_accepts_deactivated_user_without_lookup() {
        let user = alice(hasher().hash("Correct1!").unwrap(), false);
        let claims = auth::Claims::from(&user);
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let authenticator = authenticator();
        let pair = authenticator.issue_token_pair(&claims).unwrap();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), false);

        let result = service.refresh(&pair.refresh_token).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_gated_rejects_missing_user() {
        let user = alice(hasher().hash("Correct1!").unwrap(), true);
        let claims = auth::Claims::from(&user);
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let authenticator = authenticator();
        let pair = authenticator.issue_token_pair(&claims).unwrap();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator), true);

        let result = service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
