use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{
    AddWishlistRequest, ApiError, ApiResponse, AppState, MessageResponse, WishlistItemDto,
};
use crate::security::Claims;

/// POST /wishlist
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddWishlistRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WishlistItemDto>>), ApiError> {
    let hotel_room_id = validate_id(payload.hotel_room_id, "hotel room")?;

    let item = state
        .shared
        .wishlist_service
        .add(claims.id, hotel_room_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// GET /wishlist
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<WishlistItemDto>>>, ApiError> {
    let items = state.shared.wishlist_service.list(claims.id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// DELETE /wishlist/{id}
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "wishlist item")?;

    state.shared.wishlist_service.remove(claims.id, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Removed from wishlist",
    ))))
}
