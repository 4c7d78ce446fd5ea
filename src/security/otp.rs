//! One-time codes for login MFA and password reset.
//!
//! Both flows share the single OTP slot on [`Credentials`], so issuing a
//! code for one invalidates any outstanding code for the other.

use chrono::{DateTime, Utc};
use rand::Rng;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::constants::otp::{DIGITS, LIFETIME_MS};
use crate::models::{Credentials, OtpChallenge};

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum OtpError {
    #[error("No OTP found. Request a new code")]
    NotFound,

    #[error("OTP has expired. Request a new code")]
    Expired,

    #[error("Invalid OTP")]
    Mismatch,
}

/// Uniformly random code in `000000..=999999`.
#[must_use]
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:0DIGITS$}")
}

/// Generates a fresh code and installs it, replacing any earlier one.
pub fn issue(credentials: &mut Credentials, now: DateTime<Utc>) -> String {
    let code = generate_code();
    install(credentials, code.clone(), now);
    code
}

/// Installs a known code. Used by [`issue`] and by tests that need a
/// deterministic value.
pub fn install(credentials: &mut Credentials, code: String, now: DateTime<Utc>) {
    credentials.otp = Some(OtpChallenge {
        code,
        expires_at_ms: now.timestamp_millis() + LIFETIME_MS,
    });
}

/// Consumes the outstanding challenge if `code` matches and it has not
/// expired. An expired challenge is cleared; a mismatch leaves it in place.
pub fn verify(credentials: &mut Credentials, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
    let Some(challenge) = credentials.otp.as_ref() else {
        return Err(OtpError::NotFound);
    };

    if now.timestamp_millis() > challenge.expires_at_ms {
        credentials.otp = None;
        return Err(OtpError::Expired);
    }

    if !bool::from(challenge.code.as_bytes().ct_eq(code.as_bytes())) {
        return Err(OtpError::Mismatch);
    }

    credentials.otp = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_issue_sets_fifteen_minute_expiry() {
        let now = Utc::now();
        let mut creds = Credentials::default();
        let code = issue(&mut creds, now);

        let challenge = creds.otp.clone().unwrap();
        assert_eq!(challenge.code, code);
        assert_eq!(challenge.expires_at_ms, now.timestamp_millis() + 15 * 60 * 1000);
    }

    #[test]
    fn test_verify_is_single_use() {
        let t = Utc::now();
        let mut creds = Credentials::default();
        install(&mut creds, "482913".to_string(), t);

        assert_eq!(verify(&mut creds, "482913", t + Duration::minutes(14)), Ok(()));
        assert!(creds.otp.is_none());
        assert_eq!(
            verify(&mut creds, "482913", t + Duration::minutes(14)),
            Err(OtpError::NotFound)
        );
    }

    #[test]
    fn test_expired_code_is_cleared_regardless_of_value() {
        let t = Utc::now();
        let mut creds = Credentials::default();
        install(&mut creds, "123456".to_string(), t);

        assert_eq!(
            verify(&mut creds, "123456", t + Duration::minutes(15) + Duration::milliseconds(1)),
            Err(OtpError::Expired)
        );
        assert!(creds.otp.is_none());

        install(&mut creds, "123456".to_string(), t);
        assert_eq!(
            verify(&mut creds, "000000", t + Duration::minutes(16)),
            Err(OtpError::Expired)
        );
    }

    #[test]
    fn test_code_valid_at_exact_expiry() {
        let t = Utc::now();
        let mut creds = Credentials::default();
        install(&mut creds, "654321".to_string(), t);
        assert_eq!(verify(&mut creds, "654321", t + Duration::minutes(15)), Ok(()));
    }

    #[test]
    fn test_mismatch_keeps_challenge() {
        let t = Utc::now();
        let mut creds = Credentials::default();
        install(&mut creds, "111111".to_string(), t);

        assert_eq!(verify(&mut creds, "111112", t), Err(OtpError::Mismatch));
        assert_eq!(verify(&mut creds, " 111111", t), Err(OtpError::Mismatch));
        assert!(creds.otp.is_some());
        assert_eq!(verify(&mut creds, "111111", t), Ok(()));
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let t = Utc::now();
        let mut creds = Credentials::default();
        install(&mut creds, "222222".to_string(), t);
        install(&mut creds, "333333".to_string(), t);

        assert_eq!(verify(&mut creds, "222222", t), Err(OtpError::Mismatch));
        assert_eq!(verify(&mut creds, "333333", t), Ok(()));
    }
}
