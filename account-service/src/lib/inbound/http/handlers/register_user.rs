use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Profile;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<RegisterUserResponseData>, ApiError> {
    let command = body.try_into_command()?;

    tracing::debug!(caller = %caller.user_id, username = %command.username, "Registering user");

    state
        .user_service
        .register_user(command)
        .await
        .map_err(ApiError::from)
        .map(|user| {
            ApiSuccess::new(
                StatusCode::CREATED,
                RegisterUserResponseData {
                    message: "User Registered Successfully".to_string(),
                    user_id: user.id.to_string(),
                },
            )
        })
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    username: String,
    password: String,
    confirm_password: String,
    email: String,
    first_name: String,
    last_name: String,
    cpf: String,
    phone: String,
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        if password.as_str() != self.confirm_password {
            return Err(UserError::PasswordMismatch);
        }
        let email = EmailAddress::new(self.email)?;

        Ok(RegisterUserCommand::new(
            username,
            email,
            password,
            Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                cpf: self.cpf,
                phone: self.phone,
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUserResponseData {
    pub message: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm_password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: "alice".to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            cpf: "12345678909".to_string(),
            phone: "+5511999999999".to_string(),
        }
    }

    #[test]
    fn test_valid_request_becomes_command() {
        let command = request("Correct1!", "Correct1!").try_into_command().unwrap();
        assert_eq!(command.username.as_str(), "alice");
        assert_eq!(command.profile.cpf, "12345678909");
    }

    #[test]
    fn test_confirmation_mismatch() {
        let result = request("Correct1!", "Correct2!").try_into_command();
        assert!(matches!(result, Err(UserError::PasswordMismatch)));
    }

    #[test]
    fn test_weak_password() {
        let result = request("password", "password").try_into_command();
        assert!(matches!(result, Err(UserError::InvalidPassword(_))));
    }
}
