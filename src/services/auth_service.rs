//! Domain service for authentication.
//!
//! Handles registration, login with OTP second factor, password reset and
//! change, and session token verification.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Role, User};
use crate::security::{Claims, OtpError, PolicyError};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error(transparent)]
    Policy(PolicyError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Too many failed attempts. Try again in {retry_after_secs} seconds")]
    TooManyAttempts { retry_after_secs: u64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PolicyError> for AuthError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Hashing(msg) => Self::Internal(msg),
            other => Self::Policy(other),
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// A freshly minted bearer token and who it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub token: String,
    pub expires_at: String,
    pub user: UserSummary,
    pub password_expired: bool,
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Admins skip the second factor.
    Session(SessionInfo),
    /// A code was sent; finish with `verify_login_otp`.
    MfaRequired { user_id: i32 },
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user through the password policy without sending anything.
    ///
    /// # Errors
    ///
    /// [`AuthError::EmailTaken`] for a duplicate email, [`AuthError::Policy`]
    /// for a weak password.
    async fn create_account(&self, account: NewAccount) -> Result<User, AuthError>;

    /// Self-service sign-up. Emails a verification code and returns the new
    /// user's id.
    async fn register(&self, account: NewAccount) -> Result<i32, AuthError>;

    /// Checks credentials. Unknown email and wrong password are
    /// indistinguishable.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    async fn verify_login_otp(&self, user_id: i32, code: &str) -> Result<SessionInfo, AuthError>;

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Verifies the emailed code and sets the new password. A password that
    /// fails the policy leaves the code usable.
    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn logout(&self, user_id: i32) -> Result<(), AuthError>;

    /// Stateless bearer token check.
    fn authenticate(&self, token: &str) -> Result<Claims, AuthError>;

    async fn current_user(&self, user_id: i32) -> Result<UserSummary, AuthError>;
}
