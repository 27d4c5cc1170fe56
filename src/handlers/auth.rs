// handlers/auth.rs - /auth login, register and me handlers

use axum::{extract::State, Extension, Json};

use super::require_valid_email;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::resolve_user;
use crate::middleware::AuthUser;
use crate::schemas::{LoginRequest, LoginResponse, UserCreate, UserRecord, UserResponse};
use crate::state::AppState;

/// POST /auth/login - Authenticate with email and password
///
/// Signs in through the identity provider and makes sure a `users` row
/// exists for the account before answering.
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "hunter22" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiI...",
///   "token_type": "bearer",
///   "user_id": "...",
///   "email": "ada@example.com",
///   "subscription_tier": "free",
///   "chart_count": 0
/// }
/// ```
///
/// Any provider failure is a 401 "Authentication failed: ...".
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    require_valid_email(&request.email)?;

    let session = state
        .identity
        .sign_in_with_password(request.email.trim(), &request.password)
        .await
        .map_err(|e| ApiError::unauthorized(format!("Authentication failed: {}", e)))?;

    let user = resolve_user(&state, session.user, true).await;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse::bearer(session.access_token, &user)))
}

/// POST /auth/register - Create an account
///
/// The token is empty when the provider holds the account for email
/// confirmation. Provider failures are a 400 "Registration failed: ...".
pub async fn register(State(state): State<AppState>, Json(request): Json<UserCreate>) -> ApiResult<Json<LoginResponse>> {
    require_valid_email(&request.email)?;

    let outcome = state
        .identity
        .sign_up(request.email.trim(), &request.password)
        .await
        .map_err(|e| ApiError::bad_request(format!("Registration failed: {}", e)))?;

    let user_id = outcome.user.id;
    let email = outcome.user.email.unwrap_or_else(|| request.email.trim().to_string());
    let user = match state.store.create_user(&user_id, &email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Failed to create user row for {}: {}", user_id, e);
            UserRecord::basic(user_id, email)
        }
    };
    tracing::info!("Registered user {}", user.id);

    // No token until the address is confirmed
    Ok(Json(LoginResponse::bearer(outcome.access_token.unwrap_or_default(), &user)))
}

/// GET /auth/me
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
