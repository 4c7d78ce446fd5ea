use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Statuses only move forward: Pending -> Paid, and Pending or Paid ->
    /// Cancelled. Nothing leaves Cancelled.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::Cancelled)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub hotel_room_id: i32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guests: i32,
    pub rooms: i32,
    pub total_price_cents: i64,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A booking that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i32,
    pub hotel_room_id: i32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guests: i32,
    pub rooms: i32,
    pub total_price_cents: i64,
}

impl NewBooking {
    /// Checks the booking invariants relative to `now`, returning a
    /// user-facing message on failure.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), String> {
        if self.check_in_date >= self.check_out_date {
            return Err("Check-out date must be after check-in date".to_string());
        }
        if self.check_in_date < now {
            return Err("Check-in date cannot be in the past".to_string());
        }
        if self.guests < 1 {
            return Err("At least one guest is required".to_string());
        }
        if self.rooms < 1 {
            return Err("At least one room is required".to_string());
        }
        if self.total_price_cents <= 0 {
            return Err("Total price must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(now: DateTime<Utc>) -> NewBooking {
        NewBooking {
            user_id: 1,
            hotel_room_id: 1,
            check_in_date: now + Duration::days(1),
            check_out_date: now + Duration::days(3),
            guests: 2,
            rooms: 1,
            total_price_cents: 25_000,
        }
    }

    #[test]
    fn test_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Paid));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert!("paid".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_validate_booking() {
        let now = Utc::now();
        assert!(booking(now).validate(now).is_ok());

        let mut reversed = booking(now);
        reversed.check_out_date = reversed.check_in_date;
        assert!(reversed.validate(now).is_err());

        let mut past = booking(now);
        past.check_in_date = now - Duration::hours(1);
        assert!(past.validate(now).is_err());

        let mut free = booking(now);
        free.total_price_cents = 0;
        assert!(free.validate(now).is_err());

        let mut empty = booking(now);
        empty.guests = 0;
        assert!(empty.validate(now).is_err());
    }
}
