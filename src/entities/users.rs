use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub username: String,

    /// Stored lower-cased and trimmed.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub password_last_changed: Option<String>,

    pub otp: Option<String>,

    /// Epoch milliseconds. Null exactly when `otp` is null.
    pub otp_expiry: Option<i64>,

    pub role: String,

    /// AES-256-GCM ciphertext, `hex(nonce):hex(ct)`.
    pub phone: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
