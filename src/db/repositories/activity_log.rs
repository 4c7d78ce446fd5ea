use crate::entities::{activity_logs, prelude::*};
use anyhow::Result;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

pub use activity_logs::Model as ActivityLog;

pub struct ActivityLogRepository {
    conn: DatabaseConnection,
}

impl ActivityLogRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, user_id: Option<i32>, action: &str, details: Option<String>) -> Result<()> {
        let active_model = activity_logs::ActiveModel {
            user_id: Set(user_id),
            action: Set(action.to_string()),
            details: Set(details),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        ActivityLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    /// Newest first. `page` is 1-based. Returns `(items, total_pages)`.
    pub async fn page(&self, page: u64, page_size: u64) -> Result<(Vec<ActivityLog>, u64)> {
        let paginator = ActivityLogs::find()
            .order_by_desc(activity_logs::Column::Id)
            .paginate(&self.conn, page_size);

        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total_pages))
    }
}
