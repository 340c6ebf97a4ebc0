//! `SeaORM` Entity for credits table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CreditStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// One credit per order, enforced by a unique index.
    #[sea_orm(unique)]
    pub sale_order_id: Uuid,
    pub site_id: Uuid,
    pub client_id: Option<Uuid>,
    pub credit_total: Decimal,
    pub paid_total: Decimal,
    pub pending_balance: Decimal,
    pub status: CreditStatus,
    pub opened_on: Date,
    pub closed_on: Option<Date>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale_orders::Entity",
        from = "Column::SaleOrderId",
        to = "super::sale_orders::Column::Id"
    )]
    SaleOrders,
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::closeout_items::Entity")]
    CloseoutItems,
}

impl Related<super::sale_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrders.def()
    }
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::closeout_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CloseoutItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
