//! `SeaORM` Entity for site_expenses (gastos) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "site_expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    /// Set once the expense is settled inside a delivery batch.
    pub batch_id: Option<Uuid>,
    pub concept: String,
    pub amount: Decimal,
    pub incurred_on: Date,
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
        belongs_to = "super::delivery_batches::Entity",
        from = "Column::BatchId",
        to = "super::delivery_batches::Column::Id"
    )]
    DeliveryBatches,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::delivery_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
