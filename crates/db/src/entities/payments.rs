//! `SeaORM` Entity for payments (abonos) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub credit_id: Uuid,
    pub amount: Decimal,
    pub paid_on: Date,
    pub method: PaymentMethod,
    pub receipt_ref: Option<String>,
    /// Pending balance snapshot taken when the payment was registered.
    pub balance_after: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credits::Entity",
        from = "Column::CreditId",
        to = "super::credits::Column::Id"
    )]
    Credits,
    #[sea_orm(has_many = "super::delivery_line_items::Entity")]
    DeliveryLineItems,
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::delivery_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
