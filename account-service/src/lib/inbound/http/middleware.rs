use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::authentication::errors::AuthError;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the decoded access-token claims of the caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub claims: auth::Claims,
}

/// Route guard: validates the bearer access token before the handler runs
/// and adds the caller's claims to request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req).map_err(reject)?;

    let claims = state
        .authenticator
        .validate_access_token(token)
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token validation failed");
            reject(AuthError::from(e))
        })?;

    let user_id = UserId::from_string(&claims.user_id).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse user ID from token");
        reject(AuthError::InvalidToken(e.to_string()))
    })?;

    req.extensions_mut()
        .insert(AuthenticatedUser { user_id, claims });

    Ok(next.run(req).await)
}

/// Splits `<scheme> <token>`. The scheme is matched case-insensitively, so the
/// `token_type` returned by login (`bearer`) works as-is.
fn extract_token_from_header(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let (scheme, token) = auth_str
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MalformedCredential)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}

/// Every guard failure is a 401; only the message differs.
fn reject(err: AuthError) -> Response {
    let message = match err {
        AuthError::MissingCredential => "Missing Authorization header".to_string(),
        AuthError::ExpiredToken => "Expired Token".to_string(),
        AuthError::MalformedCredential => err.to_string(),
        _ => "Invalid Token".to_string(),
    };

    ApiError::Unauthorized(message).into_response()
}
