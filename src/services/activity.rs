//! Append-only audit trail of security and booking events.

use crate::db::{ActivityLog, Store};
use serde_json::Value;

/// Action names written to the activity log.
pub mod actions {
    pub const USER_REGISTER: &str = "USER_REGISTER";
    pub const ADMIN_LOGIN_SUCCESS: &str = "ADMIN_LOGIN_SUCCESS";
    pub const USER_LOGIN_OTP_SENT: &str = "USER_LOGIN_OTP_SENT";
    pub const USER_LOGIN_SUCCESS: &str = "USER_LOGIN_SUCCESS";
    pub const USER_LOGIN_FAILED: &str = "USER_LOGIN_FAILED";
    pub const USER_FORGOT_PASSWORD_OTP_SENT: &str = "USER_FORGOT_PASSWORD_OTP_SENT";
    pub const USER_PASSWORD_RESET: &str = "USER_PASSWORD_RESET";
    pub const USER_PASSWORD_CHANGED: &str = "USER_PASSWORD_CHANGED";
    pub const USER_LOGOUT: &str = "USER_LOGOUT";
    pub const USER_PROFILE_UPDATED: &str = "USER_PROFILE_UPDATED";
    pub const ADMIN_DELETE_USER: &str = "ADMIN_DELETE_USER";
    pub const CREATE_BOOKING: &str = "CREATE_BOOKING";
    pub const CANCEL_BOOKING: &str = "CANCEL_BOOKING";
    pub const DELETE_BOOKING: &str = "DELETE_BOOKING";
    pub const CREATE_CHECKOUT_SESSION: &str = "CREATE_CHECKOUT_SESSION";
    pub const PAYMENT_COMPLETED: &str = "PAYMENT_COMPLETED";
    pub const ADD_TO_WISHLIST: &str = "ADD_TO_WISHLIST";
    pub const REMOVE_FROM_WISHLIST: &str = "REMOVE_FROM_WISHLIST";
}

#[derive(Clone)]
pub struct ActivityLogService {
    store: Store,
}

impl ActivityLogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        user_id: Option<i32>,
        action: &str,
        details: Value,
    ) -> anyhow::Result<()> {
        let details = (!details.is_null()).then(|| details.to_string());
        self.store.add_activity(user_id, action, details).await?;
        tracing::debug!(action, user_id, "Activity recorded");
        Ok(())
    }

    pub async fn page(&self, page: u64, page_size: u64) -> anyhow::Result<(Vec<ActivityLog>, u64)> {
        self.store.get_activity_page(page, page_size).await
    }
}
