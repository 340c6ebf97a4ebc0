//! Sales return repository.
//!
//! A return references a finalized sale order and reduces the amount of
//! that order eligible for inclusion in future deliveries. Returns are
//! rejected once they would exceed the order total, and rejected outright
//! once a delivery batch has claimed the order - the claimed amount
//! snapshot would no longer match what the cashier hands over.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tesoro_core::credit::types::OrderStatus as CoreOrderStatus;

use crate::entities::{delivery_line_items, sale_orders, sales_returns};

/// Error types for sales return operations.
#[derive(Debug, thiserror::Error)]
pub enum SalesReturnError {
    /// The referenced order does not exist.
    #[error("Sale order not found: {0}")]
    OrderNotFound(Uuid),

    /// Invalid input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order is not in a state that accepts returns.
    #[error("Invalid order state: {0}")]
    InvalidOrderState(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, FromQueryResult)]
struct ReturnsTotalRow {
    total: Option<Decimal>,
}

/// Repository for sales returns (reembolsos).
#[derive(Debug, Clone)]
pub struct SalesReturnRepository {
    db: DatabaseConnection,
}

impl SalesReturnRepository {
    /// Creates a new sales return repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a return against a finalized sale order.
    ///
    /// The order row is locked while the running returns total is
    /// checked, so two concurrent returns cannot jointly exceed the
    /// order total.
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive amount or one that would push
    ///   the returns total past the order total
    /// - `InvalidOrderState` for non-finalized orders or orders already
    ///   claimed by a delivery batch
    pub async fn create(
        &self,
        sale_order_id: Uuid,
        amount: Decimal,
        reason: Option<String>,
        returned_on: NaiveDate,
    ) -> Result<sales_returns::Model, SalesReturnError> {
        if amount <= Decimal::ZERO {
            return Err(SalesReturnError::Validation(
                "return amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let order = sale_orders::Entity::find_by_id(sale_order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(SalesReturnError::OrderNotFound(sale_order_id))?;

        let status: CoreOrderStatus = order.status.clone().into();
        if status != CoreOrderStatus::Finalized {
            return Err(SalesReturnError::InvalidOrderState(format!(
                "order {sale_order_id} is {status}, only finalized orders accept returns"
            )));
        }

        let claimed = delivery_line_items::Entity::find()
            .filter(delivery_line_items::Column::SaleOrderId.eq(sale_order_id))
            .count(&txn)
            .await?;
        if claimed > 0 {
            return Err(SalesReturnError::InvalidOrderState(format!(
                "order {sale_order_id} is claimed by a delivery batch"
            )));
        }

        let already_returned = Self::returns_total(&txn, sale_order_id).await?;
        if already_returned + amount > order.total {
            return Err(SalesReturnError::Validation(format!(
                "returns of {} would exceed the order total {}",
                already_returned + amount,
                order.total
            )));
        }

        let sales_return = sales_returns::ActiveModel {
            id: Set(Uuid::new_v4()),
            sale_order_id: Set(sale_order_id),
            amount: Set(amount),
            reason: Set(reason),
            returned_on: Set(returned_on),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            order = %sale_order_id,
            amount = %amount,
            "sales return recorded"
        );
        Ok(sales_return)
    }

    /// Lists the returns recorded against an order.
    pub async fn list_for_order(
        &self,
        sale_order_id: Uuid,
    ) -> Result<Vec<sales_returns::Model>, SalesReturnError> {
        Ok(sales_returns::Entity::find()
            .filter(sales_returns::Column::SaleOrderId.eq(sale_order_id))
            .all(&self.db)
            .await?)
    }

    /// Authoritative sum of return amounts for an order.
    pub async fn returns_total<C: ConnectionTrait>(
        conn: &C,
        sale_order_id: Uuid,
    ) -> Result<Decimal, DbErr> {
        let row = sales_returns::Entity::find()
            .select_only()
            .column_as(sales_returns::Column::Amount.sum(), "total")
            .filter(sales_returns::Column::SaleOrderId.eq(sale_order_id))
            .into_model::<ReturnsTotalRow>()
            .one(conn)
            .await?;
        Ok(row.and_then(|r| r.total).unwrap_or(Decimal::ZERO))
    }
}
