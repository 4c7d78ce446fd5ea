use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{ActivityLog, HotelRoom, WishlistItem};
use crate::models::Booking;
use crate::services::{SessionInfo, UserProfile, UserSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Auth

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub user_id: i32,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Returned when the caller must finish login with an emailed code.
#[derive(Debug, Serialize)]
pub struct MfaChallengeResponse {
    pub mfa_required: bool,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Session(SessionInfo),
    MfaRequired(MfaChallengeResponse),
}

// Users

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

pub type UserDto = UserProfile;
pub type CurrentUserDto = UserSummary;

// Rooms

pub type HotelRoomDto = HotelRoom;

// Bookings

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub hotel_room_id: i32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guests: i32,
    pub rooms: i32,
    pub total_price_cents: i64,
}

pub type BookingDto = Booking;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

// Payments

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

// Wishlist

#[derive(Debug, Deserialize)]
pub struct AddWishlistRequest {
    pub hotel_room_id: i32,
}

pub type WishlistItemDto = WishlistItem;

// Activity log

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    crate::constants::limits::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityLog>,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}
