use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{prelude::*, processed_payment_events};

/// Idempotency ledger for payment webhook deliveries. Rows are written by
/// [`super::booking::BookingRepository::mark_paid`].
pub struct PaymentEventRepository {
    conn: DatabaseConnection,
}

impl PaymentEventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn is_processed(&self, event_id: &str) -> Result<bool> {
        let row = ProcessedPaymentEvents::find()
            .filter(processed_payment_events::Column::EventId.eq(event_id))
            .one(&self.conn)
            .await
            .context("Failed to query processed payment events")?;

        Ok(row.is_some())
    }
}
