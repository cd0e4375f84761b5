use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One customer transaction. Orders are append-only history; they are
/// never deleted, only driven through the status machine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Null for delivery/pickup orders
    pub table_id: Option<i32>,

    pub status: String,

    pub total_price: Decimal,

    pub created_at: DateTime<Utc>,

    /// Business calendar date the order was placed on; order_number is
    /// unique within this day and starts at 1
    pub order_day: NaiveDate,
    pub order_number: i32,

    pub call_waiter: bool,
    pub last_call_time: Option<DateTime<Utc>>,

    pub request_bill: bool,
    pub bill_payment_method: Option<String>,
    pub tip: Option<Decimal>,
    pub tax_id: Option<String>,

    pub estimated_completion_time: Option<DateTime<Utc>>,

    pub delivery_name: Option<String>,
    pub delivery_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_postal: Option<String>,
    pub delivery_comments: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::dining_table::Entity",
        from = "Column::TableId",
        to = "super::dining_table::Column::Id"
    )]
    DiningTable,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::dining_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
