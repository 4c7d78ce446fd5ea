//! Domain service for bookings and payment reconciliation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Booking;
use crate::security::Claims;
use crate::services::payment_gateway::CheckoutSession;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking {0} not found")]
    NotFound(i32),

    #[error("Hotel room {0} not found")]
    RoomNotFound(i32),

    #[error("You do not have access to this booking")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Payment gateway error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BookingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Booking {0} not found")]
    NotFound(i32),

    #[error("Booking {0} is cancelled and cannot be marked paid")]
    InvalidTransition(i32),

    #[error("Reconciliation failed: {0}")]
    Upstream(String),
}

impl From<anyhow::Error> for ReconcileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// This delivery moved the booking from Pending to Paid.
    Transitioned,
    /// The booking was already Paid; nothing was changed.
    AlreadyPaid,
    /// The event id was processed before.
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub hotel_room_id: i32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guests: i32,
    pub rooms: i32,
    pub total_price_cents: i64,
}

#[async_trait::async_trait]
pub trait BookingService: Send + Sync {
    async fn create(&self, user_id: i32, booking: CreateBooking) -> Result<Booking, BookingError>;

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Booking>, BookingError>;

    async fn list_all(&self) -> Result<Vec<Booking>, BookingError>;

    /// Owner or admin. Pending and Paid bookings may be cancelled.
    async fn cancel(&self, actor: &Claims, booking_id: i32) -> Result<Booking, BookingError>;

    /// Owner or admin.
    async fn delete(&self, actor: &Claims, booking_id: i32) -> Result<(), BookingError>;

    /// Opens a payment session for a Pending booking owned by `actor`.
    async fn create_checkout(
        &self,
        actor: &Claims,
        booking_id: i32,
    ) -> Result<CheckoutSession, BookingError>;

    /// Applies a confirmed payment to a booking. Safe to call repeatedly and
    /// concurrently with the same event: exactly one call transitions the
    /// booking and triggers side effects.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::NotFound`] for an unknown booking,
    /// [`ReconcileError::InvalidTransition`] for a cancelled one.
    async fn on_payment_confirmed(
        &self,
        booking_id: i32,
        event_id: &str,
    ) -> Result<ReconcileOutcome, ReconcileError>;
}
