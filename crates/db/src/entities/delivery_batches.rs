//! `SeaORM` Entity for delivery_batches (entregas de dinero) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DeliveryStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    /// Responsible cashier.
    pub employee_id: Uuid,
    pub delivery_date: Date,
    pub period_start: Date,
    pub period_end: Date,
    pub status: DeliveryStatus,
    pub expected_amount: Decimal,
    pub expense_total: Decimal,
    pub declared_cash: Decimal,
    pub declared_transfer: Decimal,
    pub declared_check: Decimal,
    pub declared_deposit: Decimal,
    pub declared_total: Decimal,
    /// Set at confirmation; `declared_total - expected_amount`.
    pub variance: Option<Decimal>,
    /// Assigned from the site counter at confirmation.
    pub voucher_number: Option<i64>,
    pub notes: Option<String>,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::workers::Entity",
        from = "Column::EmployeeId",
        to = "super::workers::Column::Id"
    )]
    Workers,
    #[sea_orm(has_many = "super::delivery_line_items::Entity")]
    DeliveryLineItems,
    #[sea_orm(has_many = "super::site_expenses::Entity")]
    SiteExpenses,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::workers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workers.def()
    }
}

impl Related<super::delivery_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryLineItems.def()
    }
}

impl Related<super::site_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SiteExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
