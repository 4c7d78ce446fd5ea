//! Domain service for user profiles and account administration.

use serde::Serialize;
use thiserror::Error;

use crate::models::Role;
use crate::security::Claims;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Validation(String),

    #[error("Administrators cannot delete their own account")]
    SelfDelete,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A user as shown to themselves or to an administrator. The phone number is
/// decrypted.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub password_expired: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    /// `Some("")` clears the stored number.
    pub phone: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn profile(&self, user_id: i32) -> Result<UserProfile, UserError>;

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<UserProfile, UserError>;

    async fn list(&self) -> Result<Vec<UserProfile>, UserError>;

    /// Removes the user with their bookings, wishlist and credentials. The
    /// activity log is kept.
    async fn delete(&self, actor: &Claims, user_id: i32) -> Result<(), UserError>;
}
