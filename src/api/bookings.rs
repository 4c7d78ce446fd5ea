use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{
    ApiError, ApiResponse, AppState, BookingDto, CheckoutResponse, CreateBookingRequest,
    MessageResponse,
};
use crate::security::Claims;
use crate::services::CreateBooking;

/// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError> {
    let hotel_room_id = validate_id(payload.hotel_room_id, "hotel room")?;

    let booking = state
        .shared
        .booking_service
        .create(
            claims.id,
            CreateBooking {
                hotel_room_id,
                check_in_date: payload.check_in_date,
                check_out_date: payload.check_out_date,
                guests: payload.guests,
                rooms: payload.rooms,
                total_price_cents: payload.total_price_cents,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(booking))))
}

/// GET /bookings/mine
pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let bookings = state.shared.booking_service.list_for_user(claims.id).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// GET /bookings
pub async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let bookings = state.shared.booking_service.list_all().await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// POST /bookings/{id}/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let id = validate_id(id, "booking")?;
    let booking = state.shared.booking_service.cancel(&claims, id).await?;
    Ok(Json(ApiResponse::success(booking)))
}

/// DELETE /bookings/{id}
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "booking")?;

    state.shared.booking_service.delete(&claims, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Booking deleted",
    ))))
}

/// POST /bookings/{id}/checkout
pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, ApiError> {
    let id = validate_id(id, "booking")?;

    let session = state
        .shared
        .booking_service
        .create_checkout(&claims, id)
        .await?;

    Ok(Json(ApiResponse::success(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    })))
}
