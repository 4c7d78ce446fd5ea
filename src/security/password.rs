//! Password strength, reuse and hashing rules.
//!
//! [`PasswordPolicy::set_password`] is the only code path that writes
//! `Credentials::password_hash`.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::constants::password::{HISTORY_LIMIT, MAX_AGE_DAYS, MIN_LENGTH, SYMBOLS};
use crate::models::{Credentials, PasswordHistoryEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error(
        "Password must be at least 8 characters long and contain uppercase, lowercase, number, and special character"
    )]
    WeakPassword,

    #[error("Cannot reuse recent passwords. Choose a new password")]
    ReusedPassword,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Checks the strength rule without touching any state.
pub fn check_strength(plaintext: &str) -> Result<(), PolicyError> {
    let long_enough = plaintext.chars().count() >= MIN_LENGTH;
    let has_lower = plaintext.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = plaintext.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = plaintext.chars().any(|c| c.is_ascii_digit());
    let has_symbol = plaintext.chars().any(|c| SYMBOLS.contains(c));

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(PolicyError::WeakPassword)
    }
}

/// True when the password was never set or is older than the maximum age.
#[must_use]
pub fn is_password_expired(credentials: &Credentials, now: DateTime<Utc>) -> bool {
    credentials
        .password_last_changed
        .is_none_or(|changed| now - changed > Duration::days(MAX_AGE_DAYS))
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    params: Params,
}

impl PasswordPolicy {
    pub fn new(config: &SecurityConfig) -> Result<Self, PolicyError> {
        Self::with_params(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
        )
    }

    pub fn with_params(
        memory_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
    ) -> Result<Self, PolicyError> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None)
            .map_err(|e| PolicyError::Hashing(format!("invalid Argon2 params: {e}")))?;
        Ok(Self { params })
    }

    /// Salted Argon2id hash in PHC string format.
    pub fn hash(&self, plaintext: &str) -> Result<String, PolicyError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PolicyError::Hashing(e.to_string()))
    }

    /// Verifies against a stored hash. Malformed hashes never match.
    #[must_use]
    pub fn verify(hash: &str, plaintext: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Validates `plaintext` and, on success, rotates it into `credentials`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::WeakPassword`] if the strength rule fails,
    /// [`PolicyError::ReusedPassword`] if it matches any remembered hash.
    /// `credentials` is left untouched on error.
    pub fn set_password(
        &self,
        credentials: &mut Credentials,
        plaintext: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        check_strength(plaintext)?;

        if credentials
            .password_history
            .iter()
            .any(|entry| Self::verify(&entry.hash, plaintext))
        {
            return Err(PolicyError::ReusedPassword);
        }

        let hash = self.hash(plaintext)?;

        credentials.password_history.insert(
            0,
            PasswordHistoryEntry {
                hash: hash.clone(),
                changed_at: now,
            },
        );
        credentials.password_history.truncate(HISTORY_LIMIT);
        credentials.password_hash = hash;
        credentials.password_last_changed = Some(now);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::with_params(64, 1, 1).unwrap()
    }

    #[test]
    fn test_strength_rule() {
        assert!(check_strength("Str0ng!pass").is_ok());
        assert!(check_strength("Aa1!aaaa").is_ok());
        assert_eq!(check_strength("Aa1!aaa"), Err(PolicyError::WeakPassword));
        assert_eq!(check_strength("alllower1!"), Err(PolicyError::WeakPassword));
        assert_eq!(check_strength("ALLUPPER1!"), Err(PolicyError::WeakPassword));
        assert_eq!(check_strength("NoDigits!!"), Err(PolicyError::WeakPassword));
        assert_eq!(check_strength("NoSymbol11"), Err(PolicyError::WeakPassword));
        assert!(check_strength("Quote\"d1x").is_ok());
        assert!(check_strength("Back\\slash1").is_ok());
    }

    #[test]
    fn test_set_password_hashes_and_records_history() {
        let policy = policy();
        let mut creds = Credentials::default();
        let now = Utc::now();

        policy.set_password(&mut creds, "First#Pass1", now).unwrap();

        assert_ne!(creds.password_hash, "First#Pass1");
        assert!(PasswordPolicy::verify(&creds.password_hash, "First#Pass1"));
        assert_eq!(creds.password_history.len(), 1);
        assert_eq!(creds.password_history[0].hash, creds.password_hash);
        assert_eq!(creds.password_last_changed, Some(now));
    }

    #[test]
    fn test_history_is_capped_newest_first() {
        let policy = policy();
        let mut creds = Credentials::default();
        let start = Utc::now();

        for i in 0..7 {
            let at = start + Duration::minutes(i);
            policy
                .set_password(&mut creds, &format!("Rotate#Pass{i}"), at)
                .unwrap();
            assert_eq!(creds.password_history.len(), (i as usize + 1).min(5));
        }

        assert_eq!(creds.password_history.len(), HISTORY_LIMIT);
        assert_eq!(creds.password_history[0].changed_at, start + Duration::minutes(6));
        assert!(
            creds
                .password_history
                .windows(2)
                .all(|pair| pair[0].changed_at > pair[1].changed_at)
        );
    }

    #[test]
    fn test_reuse_of_recent_passwords_is_rejected() {
        let policy = policy();
        let mut creds = Credentials::default();
        let now = Utc::now();

        for i in 0..5 {
            policy
                .set_password(&mut creds, &format!("Recent#Pass{i}"), now)
                .unwrap();
        }
        let before = creds.clone();

        for i in 0..5 {
            assert_eq!(
                policy.set_password(&mut creds, &format!("Recent#Pass{i}"), now),
                Err(PolicyError::ReusedPassword)
            );
        }
        assert_eq!(creds, before);
    }

    #[test]
    fn test_password_older_than_history_may_be_reused() {
        let policy = policy();
        let mut creds = Credentials::default();
        let now = Utc::now();

        for i in 0..6 {
            policy
                .set_password(&mut creds, &format!("Cycle#Pass{i}"), now)
                .unwrap();
        }

        assert!(policy.set_password(&mut creds, "Cycle#Pass0", now).is_ok());
    }

    #[test]
    fn test_weak_password_leaves_credentials_untouched() {
        let policy = policy();
        let mut creds = Credentials::default();
        assert_eq!(
            policy.set_password(&mut creds, "weak", Utc::now()),
            Err(PolicyError::WeakPassword)
        );
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn test_password_expiry() {
        let now = Utc::now();
        let mut creds = Credentials::default();
        assert!(is_password_expired(&creds, now));

        creds.password_last_changed = Some(now - Duration::days(91));
        assert!(is_password_expired(&creds, now));

        creds.password_last_changed = Some(now - Duration::days(89));
        assert!(!is_password_expired(&creds, now));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!PasswordPolicy::verify("not-a-hash", "whatever"));
    }
}
