use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{bookings, password_history, prelude::*, user_tokens, users, wishlists};
use crate::models::{Credentials, OtpChallenge, PasswordHistoryEntry, Role, User};

/// Fields for a user row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub credentials: Credentials,
}

/// Audit entry for a minted session token.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub user_id: i32,
    pub jti: String,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid stored timestamp: {value}"))
}

fn into_user(model: users::Model, history: Vec<password_history::Model>) -> Result<User> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e| anyhow::anyhow!(e))?;

    let password_history = history
        .into_iter()
        .map(|row| {
            Ok(PasswordHistoryEntry {
                changed_at: parse_timestamp(&row.changed_at)?,
                hash: row.hash,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let password_last_changed = model
        .password_last_changed
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    // A half-written challenge is treated as no challenge.
    let otp = match (model.otp, model.otp_expiry) {
        (Some(code), Some(expires_at_ms)) => Some(OtpChallenge {
            code,
            expires_at_ms,
        }),
        _ => None,
    };

    Ok(User {
        id: model.id,
        username: model.username,
        email: model.email,
        role,
        phone: model.phone,
        credentials: Credentials {
            password_hash: model.password_hash,
            password_history,
            password_last_changed,
            otp,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn history_rows(user_id: i32, credentials: &Credentials) -> Vec<password_history::ActiveModel> {
    // Oldest first so that id order matches changed_at order.
    credentials
        .password_history
        .iter()
        .rev()
        .map(|entry| password_history::ActiveModel {
            user_id: Set(user_id),
            hash: Set(entry.hash.clone()),
            changed_at: Set(entry.changed_at.to_rfc3339()),
            ..Default::default()
        })
        .collect()
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn load(&self, model: users::Model) -> Result<User> {
        let history = PasswordHistory::find()
            .filter(password_history::Column::UserId.eq(model.id))
            .order_by_desc(password_history::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query password history")?;

        into_user(model, history)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let otp = new_user.credentials.otp.as_ref();
        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.credentials.password_hash.clone()),
            password_last_changed: Set(new_user
                .credentials
                .password_last_changed
                .map(|dt| dt.to_rfc3339())),
            otp: Set(otp.map(|c| c.code.clone())),
            otp_expiry: Set(otp.map(|c| c.expires_at_ms)),
            role: Set(new_user.role.as_str().to_string()),
            phone: Set(new_user.phone),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&txn)
            .await
            .context("Failed to insert user")?;

        let rows = history_rows(model.id, &new_user.credentials);
        if !rows.is_empty() {
            PasswordHistory::insert_many(rows)
                .exec(&txn)
                .await
                .context("Failed to insert password history")?;
        }

        txn.commit().await?;

        self.load(model).await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        match user {
            Some(model) => self.load(model).await.map(Some),
            None => Ok(None),
        }
    }

    /// `email` must already be normalized.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        match user {
            Some(model) => self.load(model).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.is_some())
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let models = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(self.load(model).await?);
        }
        Ok(out)
    }

    /// Persists the whole credential block (hash, history, OTP slot) in one
    /// transaction.
    pub async fn save_credentials(&self, user_id: i32, credentials: &Credentials) -> Result<()> {
        let txn = self.conn.begin().await?;

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to query user for credential update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(credentials.password_hash.clone());
        active.password_last_changed =
            Set(credentials.password_last_changed.map(|dt| dt.to_rfc3339()));
        active.otp = Set(credentials.otp.as_ref().map(|c| c.code.clone()));
        active.otp_expiry = Set(credentials.otp.as_ref().map(|c| c.expires_at_ms));
        active.updated_at = Set(Utc::now().to_rfc3339());
        active.update(&txn).await?;

        PasswordHistory::delete_many()
            .filter(password_history::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let rows = history_rows(user_id, credentials);
        if !rows.is_empty() {
            PasswordHistory::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Writes only the OTP slot.
    pub async fn save_otp(&self, user_id: i32, otp: Option<&OtpChallenge>) -> Result<()> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for OTP update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.otp = Set(otp.map(|c| c.code.clone()));
        active.otp_expiry = Set(otp.map(|c| c.expires_at_ms));
        active.updated_at = Set(Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// `phone` of `Some(None)` clears the stored number.
    pub async fn update_profile(
        &self,
        user_id: i32,
        username: Option<String>,
        phone: Option<Option<String>>,
    ) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(phone) = phone {
            active.phone = Set(phone);
        }
        active.updated_at = Set(Utc::now().to_rfc3339());
        let model = active.update(&self.conn).await?;

        self.load(model).await.map(Some)
    }

    /// Hard delete along with everything the user owns. Activity log rows
    /// are kept.
    pub async fn delete(&self, user_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        PasswordHistory::delete_many()
            .filter(password_history::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        UserTokens::delete_many()
            .filter(user_tokens::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Wishlists::delete_many()
            .filter(wishlists::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Bookings::delete_many()
            .filter(bookings::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let result = Users::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn record_token(&self, record: TokenRecord) -> Result<()> {
        let active = user_tokens::ActiveModel {
            user_id: Set(record.user_id),
            jti: Set(record.jti),
            token_hash: Set(record.token_hash),
            issued_at: Set(record.issued_at.to_rfc3339()),
            expires_at: Set(record.expires_at.to_rfc3339()),
            ..Default::default()
        };

        UserTokens::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to record issued token")?;
        Ok(())
    }

    pub async fn token_count(&self, user_id: i32) -> Result<usize> {
        let rows = UserTokens::find()
            .filter(user_tokens::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await?;
        Ok(rows.len())
    }
}
