//! `SeaORM` Entity for sites table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_orders::Entity")]
    SaleOrders,
    #[sea_orm(has_many = "super::workers::Entity")]
    Workers,
    #[sea_orm(has_many = "super::delivery_batches::Entity")]
    DeliveryBatches,
    #[sea_orm(has_many = "super::site_expenses::Entity")]
    SiteExpenses,
}

impl Related<super::sale_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrders.def()
    }
}

impl Related<super::workers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workers.def()
    }
}

impl Related<super::delivery_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryBatches.def()
    }
}

impl Related<super::site_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SiteExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
