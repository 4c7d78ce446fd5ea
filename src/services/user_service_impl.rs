//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::db::Store;
use crate::models::User;
use crate::security::{Claims, FieldCipher, is_password_expired};
use crate::services::activity::{ActivityLogService, actions};
use crate::services::user_service::{ProfileUpdate, UserError, UserProfile, UserService};

pub struct SeaOrmUserService {
    store: Store,
    cipher: FieldCipher,
    activity: ActivityLogService,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(store: Store, cipher: FieldCipher) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
            cipher,
        }
    }

    fn to_profile(&self, user: &User) -> UserProfile {
        // A value that fails to decrypt is hidden rather than failing the read.
        let phone = user.phone.as_deref().and_then(|stored| {
            self.cipher
                .decrypt(stored)
                .map_err(|e| warn!(user_id = user.id, error = %e, "Failed to decrypt phone"))
                .ok()
        });

        UserProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            phone,
            password_expired: is_password_expired(&user.credentials, Utc::now()),
            created_at: user.created_at.clone(),
        }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn profile(&self, user_id: i32) -> Result<UserProfile, UserError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        Ok(self.to_profile(&user))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<UserProfile, UserError> {
        let username = update.username.map(|u| u.trim().to_string());
        if username.as_deref().is_some_and(str::is_empty) {
            return Err(UserError::Validation("Username cannot be empty".to_string()));
        }

        let phone = match update.phone.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(p) => Some(Some(
                self.cipher
                    .encrypt(p)
                    .map_err(|e| UserError::Internal(e.to_string()))?,
            )),
        };

        let changed = json!({
            "username": username.is_some(),
            "phone": phone.is_some(),
        });

        let user = self
            .store
            .update_user_profile(user_id, username, phone)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        self.activity
            .record(Some(user_id), actions::USER_PROFILE_UPDATED, changed)
            .await?;

        Ok(self.to_profile(&user))
    }

    async fn list(&self) -> Result<Vec<UserProfile>, UserError> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(|u| self.to_profile(u)).collect())
    }

    async fn delete(&self, actor: &Claims, user_id: i32) -> Result<(), UserError> {
        if actor.id == user_id {
            return Err(UserError::SelfDelete);
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        if !self.store.delete_user(user_id).await? {
            return Err(UserError::NotFound(user_id));
        }

        self.activity
            .record(
                Some(actor.id),
                actions::ADMIN_DELETE_USER,
                json!({ "deleted_user_id": user_id, "email": user.email }),
            )
            .await?;

        info!(user_id, admin_id = actor.id, "User deleted");
        Ok(())
    }
}
