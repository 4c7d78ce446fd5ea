pub mod prelude;

pub mod activity_logs;
pub mod bookings;
pub mod hotel_rooms;
pub mod password_history;
pub mod processed_payment_events;
pub mod user_tokens;
pub mod users;
pub mod wishlists;
