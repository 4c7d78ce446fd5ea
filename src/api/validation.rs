use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;
use crate::constants::limits::MAX_PAGE_SIZE;

const MAX_USERNAME_LEN: usize = 50;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub fn validate_id(id: i32, what: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {what} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !email_regex().is_match(trimmed) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(trimmed)
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if trimmed.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }
    Ok(trimmed)
}

/// Digits with optional `+`, `-` and spaces, 7 to 20 characters.
pub fn validate_phone(phone: &str) -> Result<&str, ApiError> {
    let trimmed = phone.trim();
    let len = trimmed.chars().count();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '));

    if !(7..=20).contains(&len) || !allowed || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("Invalid phone number"));
    }
    Ok(trimmed)
}

pub fn validate_otp(code: &str) -> Result<&str, ApiError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("OTP is required"));
    }
    Ok(trimmed)
}

pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password != confirm {
        return Err(ApiError::validation("Passwords do not match"));
    }
    Ok(())
}

pub fn validate_page(page: u64, page_size: u64) -> Result<(u64, u64), ApiError> {
    if page == 0 {
        return Err(ApiError::validation("Page must be 1 or greater"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {page_size}. Must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((page, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "booking").is_ok());
        assert!(validate_id(0, "booking").is_err());
        assert!(validate_id(-4, "booking").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.co ").unwrap(), "a@b.co");
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  alice ").unwrap(), "alice");
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 555-123-4567").is_ok());
        assert!(validate_phone("5551234").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
        assert!(validate_phone("+- - - - -").is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(1, 20).is_ok());
        assert!(validate_page(0, 20).is_err());
        assert!(validate_page(1, 0).is_err());
        assert!(validate_page(1, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_confirmation("a", "a").is_ok());
        assert!(validate_password_confirmation("a", "b").is_err());
    }
}
