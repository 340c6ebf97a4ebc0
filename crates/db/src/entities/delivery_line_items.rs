//! `SeaORM` Entity for delivery_line_items table.
//!
//! Each row claims exactly one cash sale order XOR one payment; the
//! table carries a check constraint plus partial unique indexes on
//! sale_order_id and payment_id so a target can only ever be claimed
//! once, even under concurrent claim attempts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub batch_id: Uuid,
    pub sale_order_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    /// Claimed amount snapshot, net of returns for cash orders.
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_batches::Entity",
        from = "Column::BatchId",
        to = "super::delivery_batches::Column::Id"
    )]
    DeliveryBatches,
    #[sea_orm(
        belongs_to = "super::sale_orders::Entity",
        from = "Column::SaleOrderId",
        to = "super::sale_orders::Column::Id"
    )]
    SaleOrders,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
}

impl Related<super::delivery_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryBatches.def()
    }
}

impl Related<super::sale_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrders.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
