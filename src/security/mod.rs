pub mod cipher;
pub mod otp;
pub mod password;
pub mod throttle;
pub mod token;

pub use cipher::{CipherError, FieldCipher};
pub use otp::OtpError;
pub use password::{PasswordPolicy, PolicyError, check_strength, is_password_expired};
pub use throttle::LoginThrottle;
pub use token::{Claims, Identity, IssuedToken, TokenError, TokenIssuer, TokenTtlPolicy};
