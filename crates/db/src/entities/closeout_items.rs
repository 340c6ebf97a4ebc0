//! `SeaORM` Entity for closeout_items table.
//!
//! Each row is an immutable snapshot of one credit at closeout time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closeout_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub closeout_id: Uuid,
    pub credit_id: Uuid,
    pub order_number: i64,
    pub credit_total: Decimal,
    pub prior_balance: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::closeouts::Entity",
        from = "Column::CloseoutId",
        to = "super::closeouts::Column::Id"
    )]
    Closeouts,
    #[sea_orm(
        belongs_to = "super::credits::Entity",
        from = "Column::CreditId",
        to = "super::credits::Column::Id"
    )]
    Credits,
}

impl Related<super::closeouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Closeouts.def()
    }
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
