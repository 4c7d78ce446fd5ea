use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{hotel_rooms, prelude::*};

pub use hotel_rooms::Model as HotelRoom;

#[derive(Debug, Clone)]
pub struct NewHotelRoom {
    pub title: String,
    pub description: Option<String>,
    pub hotel_name: String,
    pub location: String,
    pub price_per_night_cents: i64,
}

pub struct HotelRoomRepository {
    conn: DatabaseConnection,
}

impl HotelRoomRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, room: NewHotelRoom) -> Result<HotelRoom> {
        let active = hotel_rooms::ActiveModel {
            title: Set(room.title),
            description: Set(room.description),
            hotel_name: Set(room.hotel_name),
            location: Set(room.location),
            price_per_night_cents: Set(room.price_per_night_cents),
            available: Set(true),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert hotel room")
    }

    pub async fn get(&self, id: i32) -> Result<Option<HotelRoom>> {
        HotelRooms::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query hotel room")
    }
}
