// handlers/profile.rs - PUT /profile/update handler

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::schemas::{ProfileUpdateRequest, ProfileUpdateResponse};
use crate::state::AppState;

/// PUT /profile/update
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    if request.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let updated = state.store.update_user_profile(&user.id, &request).await.map_err(|e| {
        tracing::error!("Profile update for {} failed: {}", user.id, e);
        ApiError::internal_server_error("Failed to update profile")
    })?;
    if !updated {
        return Err(ApiError::internal_server_error("Failed to update profile"));
    }

    let refreshed = state.store.get_user_by_id(&user.id).await?;
    let (first_name, last_name) = match refreshed {
        Some(row) => (row.first_name, row.last_name),
        None => (request.first_name, request.last_name),
    };

    Ok(Json(ProfileUpdateResponse { success: true, first_name, last_name }))
}
