use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub user_id: i32,

    pub hotel_room_id: i32,

    pub check_in_date: String,

    pub check_out_date: String,

    pub guests: i32,

    pub rooms: i32,

    pub total_price_cents: i64,

    /// One of `Pending`, `Paid`, `Cancelled`
    pub payment_status: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
