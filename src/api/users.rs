use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_id, validate_phone, validate_username};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UpdateProfileRequest, UserDto};
use crate::security::Claims;
use crate::services::ProfileUpdate;

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state.shared.user_service.profile(claims.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(validate_username)
        .transpose()?
        .map(str::to_string);

    // An empty string clears the number.
    let phone = match payload.phone.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(String::new()),
        Some(p) => Some(validate_phone(p)?.to_string()),
    };

    let profile = state
        .shared
        .user_service
        .update_profile(claims.id, ProfileUpdate { username, phone })
        .await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.shared.user_service.list().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "user")?;

    state.shared.user_service.delete(&claims, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted",
    ))))
}
