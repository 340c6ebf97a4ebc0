//! `SeaORM` Entity for sales_returns (reembolsos) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_returns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_order_id: Uuid,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub returned_on: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale_orders::Entity",
        from = "Column::SaleOrderId",
        to = "super::sale_orders::Column::Id"
    )]
    SaleOrders,
}

impl Related<super::sale_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
