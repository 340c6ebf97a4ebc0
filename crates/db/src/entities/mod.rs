//! `SeaORM` entity definitions for the Tesoro schema.

pub mod clients;
pub mod closeout_items;
pub mod closeouts;
pub mod counters;
pub mod credits;
pub mod delivery_batches;
pub mod delivery_line_items;
pub mod payments;
pub mod sale_orders;
pub mod sales_returns;
pub mod sea_orm_active_enums;
pub mod site_expenses;
pub mod sites;
pub mod workers;
