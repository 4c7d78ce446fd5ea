//! `SeaORM` implementation of the `WishlistService` trait.

use async_trait::async_trait;
use serde_json::json;

use crate::db::{Store, WishlistItem};
use crate::services::activity::{ActivityLogService, actions};
use crate::services::wishlist_service::{WishlistError, WishlistService};

pub struct SeaOrmWishlistService {
    store: Store,
    activity: ActivityLogService,
}

impl SeaOrmWishlistService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
        }
    }
}

#[async_trait]
impl WishlistService for SeaOrmWishlistService {
    async fn add(&self, user_id: i32, hotel_room_id: i32) -> Result<WishlistItem, WishlistError> {
        if self.store.get_hotel_room(hotel_room_id).await?.is_none() {
            return Err(WishlistError::RoomNotFound(hotel_room_id));
        }

        let item = self
            .store
            .add_wishlist_item(user_id, hotel_room_id)
            .await?
            .ok_or(WishlistError::AlreadyAdded)?;

        self.activity
            .record(
                Some(user_id),
                actions::ADD_TO_WISHLIST,
                json!({ "hotel_room_id": hotel_room_id }),
            )
            .await?;

        Ok(item)
    }

    async fn list(&self, user_id: i32) -> Result<Vec<WishlistItem>, WishlistError> {
        Ok(self.store.list_wishlist(user_id).await?)
    }

    async fn remove(&self, user_id: i32, item_id: i32) -> Result<(), WishlistError> {
        match self.store.get_wishlist_item(item_id).await? {
            Some(item) if item.user_id == user_id => {}
            _ => return Err(WishlistError::NotFound(item_id)),
        }

        self.store.delete_wishlist_item(item_id).await?;

        self.activity
            .record(
                Some(user_id),
                actions::REMOVE_FROM_WISHLIST,
                json!({ "wishlist_item_id": item_id }),
            )
            .await?;

        Ok(())
    }
}
