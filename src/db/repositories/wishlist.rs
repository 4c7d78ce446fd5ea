use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, wishlists};

pub use wishlists::Model as WishlistItem;

pub struct WishlistRepository {
    conn: DatabaseConnection,
}

impl WishlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `None` if the room is already on the user's wishlist.
    pub async fn add(&self, user_id: i32, hotel_room_id: i32) -> Result<Option<WishlistItem>> {
        let existing = Wishlists::find()
            .filter(wishlists::Column::UserId.eq(user_id))
            .filter(wishlists::Column::HotelRoomId.eq(hotel_room_id))
            .one(&self.conn)
            .await
            .context("Failed to query wishlist")?;

        if existing.is_some() {
            return Ok(None);
        }

        let active = wishlists::ActiveModel {
            user_id: Set(user_id),
            hotel_room_id: Set(hotel_room_id),
            added_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert wishlist item")?;

        Ok(Some(model))
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<WishlistItem>> {
        Wishlists::find()
            .filter(wishlists::Column::UserId.eq(user_id))
            .order_by_desc(wishlists::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list wishlist")
    }

    pub async fn get(&self, id: i32) -> Result<Option<WishlistItem>> {
        Wishlists::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query wishlist item")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Wishlists::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
