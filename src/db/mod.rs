use crate::models::booking::NewBooking;
use crate::models::{Booking, Credentials, OtpChallenge, PaymentStatus, User};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::activity_log::ActivityLog;
pub use repositories::hotel_room::{HotelRoom, NewHotelRoom};
pub use repositories::user::{NewUser, TokenRecord};
pub use repositories::wishlist::WishlistItem;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn booking_repo(&self) -> repositories::booking::BookingRepository {
        repositories::booking::BookingRepository::new(self.conn.clone())
    }

    fn hotel_room_repo(&self) -> repositories::hotel_room::HotelRoomRepository {
        repositories::hotel_room::HotelRoomRepository::new(self.conn.clone())
    }

    fn wishlist_repo(&self) -> repositories::wishlist::WishlistRepository {
        repositories::wishlist::WishlistRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity_log::ActivityLogRepository {
        repositories::activity_log::ActivityLogRepository::new(self.conn.clone())
    }

    fn payment_event_repo(&self) -> repositories::payment_event::PaymentEventRepository {
        repositories::payment_event::PaymentEventRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, user: NewUser) -> Result<User> {
        self.user_repo().create(user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn save_credentials(&self, user_id: i32, credentials: &Credentials) -> Result<()> {
        self.user_repo().save_credentials(user_id, credentials).await
    }

    pub async fn save_otp(&self, user_id: i32, otp: Option<&OtpChallenge>) -> Result<()> {
        self.user_repo().save_otp(user_id, otp).await
    }

    pub async fn update_user_profile(
        &self,
        user_id: i32,
        username: Option<String>,
        phone: Option<Option<String>>,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update_profile(user_id, username, phone)
            .await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        self.user_repo().delete(user_id).await
    }

    pub async fn record_token(&self, record: TokenRecord) -> Result<()> {
        self.user_repo().record_token(record).await
    }

    pub async fn token_count(&self, user_id: i32) -> Result<usize> {
        self.user_repo().token_count(user_id).await
    }

    // Rooms

    pub async fn add_hotel_room(&self, room: NewHotelRoom) -> Result<HotelRoom> {
        self.hotel_room_repo().create(room).await
    }

    pub async fn get_hotel_room(&self, id: i32) -> Result<Option<HotelRoom>> {
        self.hotel_room_repo().get(id).await
    }

    // Bookings

    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking> {
        self.booking_repo().create(booking).await
    }

    pub async fn get_booking(&self, id: i32) -> Result<Option<Booking>> {
        self.booking_repo().get(id).await
    }

    pub async fn list_bookings_for_user(&self, user_id: i32) -> Result<Vec<Booking>> {
        self.booking_repo().list_for_user(user_id).await
    }

    pub async fn list_all_bookings(&self) -> Result<Vec<Booking>> {
        self.booking_repo().list_all().await
    }

    pub async fn transition_booking(
        &self,
        id: i32,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool> {
        self.booking_repo().transition(id, from, to).await
    }

    /// Pending -> Paid plus the ledger row for `event_id`, atomically.
    pub async fn mark_booking_paid(&self, id: i32, event_id: &str) -> Result<bool> {
        self.booking_repo().mark_paid(id, event_id).await
    }

    pub async fn delete_booking(&self, id: i32) -> Result<bool> {
        self.booking_repo().delete(id).await
    }

    // Payment events

    pub async fn is_payment_event_processed(&self, event_id: &str) -> Result<bool> {
        self.payment_event_repo().is_processed(event_id).await
    }

    // Wishlist

    pub async fn add_wishlist_item(
        &self,
        user_id: i32,
        hotel_room_id: i32,
    ) -> Result<Option<WishlistItem>> {
        self.wishlist_repo().add(user_id, hotel_room_id).await
    }

    pub async fn list_wishlist(&self, user_id: i32) -> Result<Vec<WishlistItem>> {
        self.wishlist_repo().list_for_user(user_id).await
    }

    pub async fn get_wishlist_item(&self, id: i32) -> Result<Option<WishlistItem>> {
        self.wishlist_repo().get(id).await
    }

    pub async fn delete_wishlist_item(&self, id: i32) -> Result<bool> {
        self.wishlist_repo().delete(id).await
    }

    // Activity log

    pub async fn add_activity(
        &self,
        user_id: Option<i32>,
        action: &str,
        details: Option<String>,
    ) -> Result<()> {
        self.activity_repo().add(user_id, action, details).await
    }

    pub async fn get_activity_page(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<ActivityLog>, u64)> {
        self.activity_repo().page(page, page_size).await
    }
}
