use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, HotelRoomDto};

/// GET /hotel-rooms/{id}
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<HotelRoomDto>>, ApiError> {
    let id = validate_id(id, "hotel room")?;

    let room = state
        .store()
        .get_hotel_room(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Hotel room", id))?;

    Ok(Json(ApiResponse::success(room)))
}
