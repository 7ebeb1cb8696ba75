use crate::domain::user::models::User;

/// Credentials submitted on sign-in, unvalidated.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&User> for auth::Claims {
    fn from(user: &User) -> Self {
        auth::Claims::new(
            user.id,
            user.username.as_str(),
            user.email.as_str(),
            user.role_id.as_str(),
        )
    }
}
