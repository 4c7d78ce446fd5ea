//! Domain service for saved hotel rooms.

use thiserror::Error;

use crate::db::WishlistItem;

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Wishlist item {0} not found")]
    NotFound(i32),

    #[error("Hotel room {0} not found")]
    RoomNotFound(i32),

    #[error("Hotel room is already in your wishlist")]
    AlreadyAdded,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for WishlistError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WishlistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait WishlistService: Send + Sync {
    async fn add(&self, user_id: i32, hotel_room_id: i32) -> Result<WishlistItem, WishlistError>;

    async fn list(&self, user_id: i32) -> Result<Vec<WishlistItem>, WishlistError>;

    /// Only the owner may remove an item; anyone else gets `NotFound`.
    async fn remove(&self, user_id: i32, item_id: i32) -> Result<(), WishlistError>;
}
