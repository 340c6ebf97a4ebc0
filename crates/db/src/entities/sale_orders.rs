//! `SeaORM` Entity for sale_orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{OrderKind, OrderStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    pub worker_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    /// Human-facing sequential number, site-scoped.
    pub order_number: i64,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub issued_on: Date,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    pub source_retention_enabled: bool,
    pub source_retention_percent: Decimal,
    pub source_retention_amount: Decimal,
    pub ica_retention_enabled: bool,
    pub ica_retention_percent: Decimal,
    pub ica_retention_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sites::Entity",
        from = "Column::SiteId",
        to = "super::sites::Column::Id"
    )]
    Sites,
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "super::workers::Entity",
        from = "Column::WorkerId",
        to = "super::workers::Column::Id"
    )]
    Workers,
    #[sea_orm(has_one = "super::credits::Entity")]
    Credits,
    #[sea_orm(has_many = "super::sales_returns::Entity")]
    SalesReturns,
    #[sea_orm(has_many = "super::delivery_line_items::Entity")]
    DeliveryLineItems,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::workers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workers.def()
    }
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::sales_returns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesReturns.def()
    }
}

impl Related<super::delivery_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
