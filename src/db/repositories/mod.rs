pub mod activity_log;
pub mod booking;
pub mod hotel_room;
pub mod payment_event;
pub mod user;
pub mod wishlist;
