pub mod booking;
pub mod user;

pub use booking::{Booking, PaymentStatus};
pub use user::{Credentials, OtpChallenge, PasswordHistoryEntry, Role, User};
