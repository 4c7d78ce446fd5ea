//! `SeaORM` implementation of the `BookingService` trait.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::Store;
use crate::models::booking::NewBooking;
use crate::models::{Booking, PaymentStatus};
use crate::security::Claims;
use crate::services::activity::{ActivityLogService, actions};
use crate::services::booking_service::{
    BookingError, BookingService, CreateBooking, ReconcileError, ReconcileOutcome,
};
use crate::services::notifier::{Notifier, send_best_effort, templates};
use crate::services::payment_gateway::{CheckoutRequest, CheckoutSession, PaymentGateway};

pub struct SeaOrmBookingService {
    store: Store,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn PaymentGateway>,
    activity: ActivityLogService,
    currency: String,
}

impl SeaOrmBookingService {
    #[must_use]
    pub fn new(
        store: Store,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
    ) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
            notifier,
            gateway,
            currency,
        }
    }

    async fn owned_booking(&self, actor: &Claims, booking_id: i32) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;

        if booking.user_id != actor.id && !actor.role.is_admin() {
            return Err(BookingError::Forbidden);
        }

        Ok(booking)
    }

    async fn reload(&self, booking_id: i32) -> Result<Booking, BookingError> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))
    }

    async fn send_payment_confirmation(&self, booking: &Booking) {
        match self.store.get_user(booking.user_id).await {
            Ok(Some(user)) => {
                let (subject, body) =
                    templates::payment_confirmed(&user.username, booking.id, booking.total_price_cents);
                send_best_effort(self.notifier.as_ref(), &user.email, subject, &body).await;
            }
            Ok(None) => warn!(booking_id = booking.id, "Paid booking has no owner to notify"),
            Err(e) => warn!(error = %e, booking_id = booking.id, "Failed to load booking owner"),
        }
    }
}

#[async_trait]
impl BookingService for SeaOrmBookingService {
    async fn create(&self, user_id: i32, booking: CreateBooking) -> Result<Booking, BookingError> {
        let room = self
            .store
            .get_hotel_room(booking.hotel_room_id)
            .await?
            .ok_or(BookingError::RoomNotFound(booking.hotel_room_id))?;

        if !room.available {
            return Err(BookingError::Validation(
                "Hotel room is not available".to_string(),
            ));
        }

        let new_booking = NewBooking {
            user_id,
            hotel_room_id: room.id,
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            guests: booking.guests,
            rooms: booking.rooms,
            total_price_cents: booking.total_price_cents,
        };
        new_booking
            .validate(Utc::now())
            .map_err(BookingError::Validation)?;

        let created = self.store.create_booking(&new_booking).await?;

        self.activity
            .record(
                Some(user_id),
                actions::CREATE_BOOKING,
                json!({
                    "booking_id": created.id,
                    "hotel_room_id": created.hotel_room_id,
                    "total_price_cents": created.total_price_cents,
                }),
            )
            .await?;

        info!(booking_id = created.id, user_id, "Booking created");
        Ok(created)
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_bookings_for_user(user_id).await?)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_all_bookings().await?)
    }

    async fn cancel(&self, actor: &Claims, booking_id: i32) -> Result<Booking, BookingError> {
        let booking = self.owned_booking(actor, booking_id).await?;

        if !booking
            .payment_status
            .can_transition_to(PaymentStatus::Cancelled)
        {
            return Err(BookingError::InvalidTransition(format!(
                "Booking is already {}",
                booking.payment_status
            )));
        }

        // A concurrent webhook may have moved it from Pending to Paid; the
        // Paid -> Cancelled edge is also allowed, so retry once from there.
        let mut cancelled = self
            .store
            .transition_booking(booking_id, booking.payment_status, PaymentStatus::Cancelled)
            .await?;
        if !cancelled && booking.payment_status == PaymentStatus::Pending {
            cancelled = self
                .store
                .transition_booking(booking_id, PaymentStatus::Paid, PaymentStatus::Cancelled)
                .await?;
        }

        let current = self.reload(booking_id).await?;
        if !cancelled && current.payment_status != PaymentStatus::Cancelled {
            return Err(BookingError::InvalidTransition(format!(
                "Booking is {}",
                current.payment_status
            )));
        }

        self.activity
            .record(
                Some(actor.id),
                actions::CANCEL_BOOKING,
                json!({ "booking_id": booking_id }),
            )
            .await?;

        Ok(current)
    }

    async fn delete(&self, actor: &Claims, booking_id: i32) -> Result<(), BookingError> {
        self.owned_booking(actor, booking_id).await?;

        if !self.store.delete_booking(booking_id).await? {
            return Err(BookingError::NotFound(booking_id));
        }

        self.activity
            .record(
                Some(actor.id),
                actions::DELETE_BOOKING,
                json!({ "booking_id": booking_id }),
            )
            .await?;

        Ok(())
    }

    async fn create_checkout(
        &self,
        actor: &Claims,
        booking_id: i32,
    ) -> Result<CheckoutSession, BookingError> {
        let booking = self.owned_booking(actor, booking_id).await?;

        if booking.payment_status != PaymentStatus::Pending {
            return Err(BookingError::InvalidTransition(format!(
                "Booking is {} and cannot be paid",
                booking.payment_status
            )));
        }

        let description = match self.store.get_hotel_room(booking.hotel_room_id).await? {
            Some(room) => format!("{} - {}", room.hotel_name, room.title),
            None => "Booking Payment".to_string(),
        };

        let session = self
            .gateway
            .create_checkout_session(&CheckoutRequest {
                booking_id: booking.id,
                amount_cents: booking.total_price_cents,
                currency: self.currency.clone(),
                description,
            })
            .await
            .map_err(|e| BookingError::Upstream(e.to_string()))?;

        self.activity
            .record(
                Some(actor.id),
                actions::CREATE_CHECKOUT_SESSION,
                json!({
                    "booking_id": booking.id,
                    "session_id": session.id,
                    "total_price_cents": booking.total_price_cents,
                }),
            )
            .await?;

        Ok(session)
    }

    async fn on_payment_confirmed(
        &self,
        booking_id: i32,
        event_id: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(ReconcileError::NotFound(booking_id))?;

        // A cancelled booking never accepts a payment, even a replayed one.
        if booking.payment_status == PaymentStatus::Cancelled {
            return Err(ReconcileError::InvalidTransition(booking_id));
        }

        if self.store.is_payment_event_processed(event_id).await? {
            info!(booking_id, event_id, "Duplicate payment event ignored");
            return Ok(ReconcileOutcome::Duplicate);
        }

        if booking.payment_status == PaymentStatus::Paid {
            return Ok(ReconcileOutcome::AlreadyPaid);
        }

        let won = self.store.mark_booking_paid(booking_id, event_id).await?;

        if !won {
            // Lost a race; report what the winner left behind.
            let current = self
                .store
                .get_booking(booking_id)
                .await?
                .ok_or(ReconcileError::NotFound(booking_id))?;

            return match current.payment_status {
                PaymentStatus::Paid => Ok(ReconcileOutcome::AlreadyPaid),
                _ => Err(ReconcileError::InvalidTransition(booking_id)),
            };
        }

        // Committed. Failures below are logged, not returned.
        self.send_payment_confirmation(&booking).await;

        if let Err(e) = self
            .activity
            .record(
                None,
                actions::PAYMENT_COMPLETED,
                json!({ "booking_id": booking_id, "event_id": event_id }),
            )
            .await
        {
            warn!(error = %e, booking_id, event_id, "Failed to record payment audit entry");
        }

        metrics::counter!("bookings_paid_total").increment(1);
        info!(booking_id, event_id, "Booking marked as paid");

        Ok(ReconcileOutcome::Transitioned)
    }
}
