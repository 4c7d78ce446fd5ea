use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};

use super::user::parse_timestamp;
use crate::entities::{bookings, prelude::*, processed_payment_events};
use crate::models::booking::NewBooking;
use crate::models::{Booking, PaymentStatus};

fn into_booking(model: bookings::Model) -> Result<Booking> {
    Ok(Booking {
        id: model.id,
        user_id: model.user_id,
        hotel_room_id: model.hotel_room_id,
        check_in_date: parse_timestamp(&model.check_in_date)?,
        check_out_date: parse_timestamp(&model.check_out_date)?,
        guests: model.guests,
        rooms: model.rooms,
        total_price_cents: model.total_price_cents,
        payment_status: model
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| anyhow::anyhow!(e))?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub struct BookingRepository {
    conn: DatabaseConnection,
}

impl BookingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, booking: &NewBooking) -> Result<Booking> {
        let now = Utc::now().to_rfc3339();

        let active = bookings::ActiveModel {
            user_id: Set(booking.user_id),
            hotel_room_id: Set(booking.hotel_room_id),
            check_in_date: Set(booking.check_in_date.to_rfc3339()),
            check_out_date: Set(booking.check_out_date.to_rfc3339()),
            guests: Set(booking.guests),
            rooms: Set(booking.rooms),
            total_price_cents: Set(booking.total_price_cents),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert booking")?;

        into_booking(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Booking>> {
        Bookings::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query booking")?
            .map(into_booking)
            .transpose()
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Booking>> {
        Bookings::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list bookings for user")?
            .into_iter()
            .map(into_booking)
            .collect()
    }

    pub async fn list_all(&self) -> Result<Vec<Booking>> {
        Bookings::find()
            .order_by_desc(bookings::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list bookings")?
            .into_iter()
            .map(into_booking)
            .collect()
    }

    /// Moves the booking from `from` to `to` only if it is still in `from`.
    /// Returns whether this call performed the transition, so concurrent
    /// callers racing on the same row see exactly one `true`.
    pub async fn transition(&self, id: i32, from: PaymentStatus, to: PaymentStatus) -> Result<bool> {
        let result = Bookings::update_many()
            .col_expr(bookings::Column::PaymentStatus, Expr::value(to.as_str()))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
            .filter(bookings::Column::Id.eq(id))
            .filter(bookings::Column::PaymentStatus.eq(from.as_str()))
            .exec(&self.conn)
            .await
            .context("Failed to update booking status")?;

        Ok(result.rows_affected == 1)
    }

    /// Moves a Pending booking to Paid and records `event_id` in the payment
    /// ledger in one transaction. Returns `false`, changing nothing, when the
    /// booking was no longer Pending.
    pub async fn mark_paid(&self, id: i32, event_id: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let result = Bookings::update_many()
            .col_expr(bookings::Column::PaymentStatus, Expr::value(PaymentStatus::Paid.as_str()))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(bookings::Column::Id.eq(id))
            .filter(bookings::Column::PaymentStatus.eq(PaymentStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .context("Failed to mark booking as paid")?;

        if result.rows_affected != 1 {
            txn.rollback().await?;
            return Ok(false);
        }

        let event = processed_payment_events::ActiveModel {
            event_id: Set(event_id.to_string()),
            booking_id: Set(id),
            processed_at: Set(now),
            ..Default::default()
        };

        ProcessedPaymentEvents::insert(event)
            .on_conflict(
                OnConflict::column(processed_payment_events::Column::EventId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("Failed to record payment event")?;

        txn.commit().await?;
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Bookings::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
