use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use account_service::authentication::service::AuthService;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::Password;
use account_service::domain::user::models::Profile;
use account_service::domain::user::models::RegisterUserCommand;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::models::Username;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenSettings;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin#pass1";
pub const USER_PASSWORD: &str = "Correct1!";

/// Process-local user store so the HTTP surface can be exercised without Postgres.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn snapshot(&self, id: &UserId) -> Option<User> {
        self.users.read().unwrap().get(id).cloned()
    }

    fn username_taken(users: &HashMap<UserId, User>, user: &User) -> bool {
        users
            .values()
            .any(|other| other.id != user.id && other.username == user.username)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if Self::username_taken(&users, &user) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        if Self::username_taken(&users, &user) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_active(
        &self,
        id: &UserId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.is_active = is_active;
        user.deactivated_at = if is_active { None } else { Some(at) };
        user.updated_at = Some(at);
        Ok(user.clone())
    }

    async fn record_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError> {
        if let Some(user) = self.users.write().unwrap().get_mut(id) {
            user.last_login = Some(at);
        }
        Ok(())
    }
}

pub fn token_settings() -> TokenSettings {
    TokenSettings {
        access_secret: "test-access-secret-at-least-32-bytes-long".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-bytes-long".to_string(),
        algorithm: "HS256".to_string(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    }
}

/// Sign `claims` with `secret` so that the token expired `seconds_ago`.
pub fn expired_token(claims: &auth::Claims, secret: &str, seconds_ago: i64) -> String {
    let issued = Utc::now() - Duration::minutes(30);
    let claims = claims
        .payload()
        .with_issued_at(issued.timestamp())
        .with_expiration(Utc::now().timestamp() - seconds_ago);

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

fn test_hasher() -> PasswordHasher {
    PasswordHasher::with_params(8 * 1024, 1, 1).expect("valid test params")
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub admin: User,
    pub admin_token: String,
}

impl TestApp {
    /// Spawn the application with refresh gating enabled.
    pub async fn spawn() -> Self {
        Self::spawn_with_gate(true).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_gate(gate_refresh_on_active_status: bool) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(
            Authenticator::new(test_hasher(), &token_settings())
                .expect("Failed to create authenticator"),
        );

        let user_service = Arc::new(UserService::new(Arc::clone(&repository), test_hasher()));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
            gate_refresh_on_active_status,
        ));

        let admin = user_service
            .ensure_bootstrap_user(RegisterUserCommand::new(
                Username::new(ADMIN_USERNAME.to_string()).unwrap(),
                EmailAddress::new("admin@example.com".to_string()).unwrap(),
                Password::new(ADMIN_PASSWORD.to_string()).unwrap(),
                Profile {
                    first_name: "Ada".to_string(),
                    last_name: "Admin".to_string(),
                    cpf: String::new(),
                    phone: String::new(),
                },
            ))
            .await
            .expect("Failed to seed bootstrap admin")
            .expect("Bootstrap admin already existed");

        let admin_token = authenticator
            .issue_access_token(&(&admin).into())
            .expect("Failed to issue admin token");

        let router = create_router(
            user_service,
            auth_service,
            Arc::clone(&authenticator),
            &["*".to_string()],
        );

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
            admin,
            admin_token,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request as the bootstrap admin
    pub fn get_as_admin(&self, path: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(&self.admin_token)
    }

    /// Helper to make POST request as the bootstrap admin
    pub fn post_as_admin(&self, path: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(&self.admin_token)
    }

    /// Helper to make PATCH request as the bootstrap admin
    pub fn patch_as_admin(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(&self.admin_token)
    }

    /// Helper to make DELETE request as the bootstrap admin
    pub fn delete_as_admin(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(&self.admin_token)
    }

    /// Register a user through the API and return its id. The user starts inactive.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post_as_admin("/users/register")
            .json(&json!({
                "username": username,
                "password": USER_PASSWORD,
                "confirm_password": USER_PASSWORD,
                "email": format!("{username}@example.com"),
                "first_name": "Test",
                "last_name": "User",
                "cpf": "12345678909",
                "phone": "+5511999999999"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["user_id"]
            .as_str()
            .expect("user_id missing")
            .to_string()
    }

    /// Register and activate a user, returning its id.
    pub async fn register_active(&self, username: &str) -> String {
        let user_id = self.register(username).await;
        let response = self
            .patch_as_admin(&format!("/users/{user_id}/activate"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        user_id
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post("/auth/refresh")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
