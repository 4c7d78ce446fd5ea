pub use super::activity_logs::Entity as ActivityLogs;
pub use super::bookings::Entity as Bookings;
pub use super::hotel_rooms::Entity as HotelRooms;
pub use super::password_history::Entity as PasswordHistory;
pub use super::processed_payment_events::Entity as ProcessedPaymentEvents;
pub use super::user_tokens::Entity as UserTokens;
pub use super::users::Entity as Users;
pub use super::wishlists::Entity as Wishlists;
