//! Sale order repository.
//!
//! Orders enter the ledger already finalized: creation assigns the
//! site-scoped order number from the counter, computes withholding
//! amounts, and opens the credit for credit-kind orders, all inside one
//! transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tesoro_core::credit::{CreditError, CreditService, OrderSnapshot};
use tesoro_core::credit::types::{OrderKind, OrderStatus};
use tesoro_core::retention::{RetentionCalculator, RetentionInput};
use tesoro_shared::types::round_money;

use crate::entities::{credits, sale_orders};
use crate::repositories::sequence::{ORDER_NUMBER_SCOPE, SequenceRepository};

/// Error types for sale order operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleOrderError {
    /// Order not found.
    #[error("Sale order not found: {0}")]
    NotFound(Uuid),

    /// Invalid input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credit opening failed.
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a finalized sale order.
#[derive(Debug, Clone)]
pub struct CreateSaleOrderInput {
    /// The site the sale belongs to.
    pub site_id: Uuid,
    /// Optional salesperson.
    pub worker_id: Option<Uuid>,
    /// Optional client (required in practice for credit sales).
    pub client_id: Option<Uuid>,
    /// Cash or credit sale.
    pub kind: OrderKind,
    /// Issue date.
    pub issued_on: NaiveDate,
    /// Subtotal before tax and discounts.
    pub subtotal: Decimal,
    /// Discount total.
    pub discount_total: Decimal,
    /// Tax (IVA) total.
    pub tax_total: Decimal,
    /// Whether source retention applies.
    pub source_retention_enabled: bool,
    /// Source retention percentage.
    pub source_retention_percent: Decimal,
    /// Whether ICA retention applies.
    pub ica_retention_enabled: bool,
    /// ICA retention percentage.
    pub ica_retention_percent: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Sale order repository.
#[derive(Debug, Clone)]
pub struct SaleOrderRepository {
    db: DatabaseConnection,
}

impl SaleOrderRepository {
    /// Creates a new sale order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a finalized sale order, numbering it from the site
    /// counter and opening the credit for credit-kind orders.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed amounts, `Credit` when credit
    /// opening is rejected, or `Database` on persistence failure.
    pub async fn create_finalized(
        &self,
        input: CreateSaleOrderInput,
    ) -> Result<(sale_orders::Model, Option<credits::Model>), SaleOrderError> {
        Self::validate(&input)?;

        let txn = self.db.begin().await?;

        let order_number =
            SequenceRepository::next_value(&txn, ORDER_NUMBER_SCOPE, input.site_id).await?;
        let order = Self::insert_order(&txn, &input, order_number).await?;

        let credit = if input.kind == OrderKind::Credit {
            Some(Self::insert_credit(&txn, &input, &order).await?)
        } else {
            None
        };

        txn.commit().await?;

        info!(
            order = %order.id,
            number = order.order_number,
            kind = %input.kind,
            "sale order finalized"
        );
        Ok((order, credit))
    }

    fn validate(input: &CreateSaleOrderInput) -> Result<(), SaleOrderError> {
        if input.subtotal < Decimal::ZERO {
            return Err(SaleOrderError::Validation(
                "subtotal cannot be negative".to_string(),
            ));
        }
        if input.discount_total < Decimal::ZERO || input.tax_total < Decimal::ZERO {
            return Err(SaleOrderError::Validation(
                "discount and tax totals cannot be negative".to_string(),
            ));
        }
        let total = input.subtotal - input.discount_total + input.tax_total;
        if total < Decimal::ZERO {
            return Err(SaleOrderError::Validation(
                "discounts cannot exceed the subtotal plus tax".to_string(),
            ));
        }
        if input.kind == OrderKind::Credit && input.client_id.is_none() {
            return Err(SaleOrderError::Validation(
                "credit sales require a client".to_string(),
            ));
        }
        Ok(())
    }

    async fn insert_order(
        txn: &DatabaseTransaction,
        input: &CreateSaleOrderInput,
        order_number: i64,
    ) -> Result<sale_orders::Model, SaleOrderError> {
        let retention = RetentionCalculator::compute(&RetentionInput {
            subtotal: input.subtotal,
            source_enabled: input.source_retention_enabled,
            source_percent: input.source_retention_percent,
            ica_enabled: input.ica_retention_enabled,
            ica_percent: input.ica_retention_percent,
        });
        let total = round_money(input.subtotal - input.discount_total + input.tax_total);
        let now = Utc::now().into();

        let order = sale_orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(input.site_id),
            worker_id: Set(input.worker_id),
            client_id: Set(input.client_id),
            order_number: Set(order_number),
            kind: Set(input.kind.into()),
            status: Set(OrderStatus::Finalized.into()),
            issued_on: Set(input.issued_on),
            subtotal: Set(round_money(input.subtotal)),
            discount_total: Set(round_money(input.discount_total)),
            tax_total: Set(round_money(input.tax_total)),
            total: Set(total),
            source_retention_enabled: Set(input.source_retention_enabled),
            source_retention_percent: Set(RetentionCalculator::clamp_percent(
                input.source_retention_percent,
            )),
            source_retention_amount: Set(retention.source_amount),
            ica_retention_enabled: Set(input.ica_retention_enabled),
            ica_retention_percent: Set(RetentionCalculator::clamp_percent(
                input.ica_retention_percent,
            )),
            ica_retention_amount: Set(retention.ica_amount),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(order.insert(txn).await?)
    }

    async fn insert_credit(
        txn: &DatabaseTransaction,
        input: &CreateSaleOrderInput,
        order: &sale_orders::Model,
    ) -> Result<credits::Model, SaleOrderError> {
        let snapshot = OrderSnapshot {
            id: order.id,
            kind: order.kind.clone().into(),
            status: order.status.clone().into(),
            total: order.total,
            source_withholding: order.source_retention_amount,
            ica_withholding: order.ica_retention_amount,
            has_credit: false,
        };
        let new_credit = CreditService::open_credit(&snapshot, input.issued_on)?;
        let now = Utc::now().into();

        let credit = credits::ActiveModel {
            id: Set(Uuid::new_v4()),
            sale_order_id: Set(order.id),
            site_id: Set(order.site_id),
            client_id: Set(order.client_id),
            credit_total: Set(new_credit.credit_total),
            paid_total: Set(Decimal::ZERO),
            pending_balance: Set(new_credit.pending_balance),
            status: Set(new_credit.status.into()),
            opened_on: Set(new_credit.opened_on),
            closed_on: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = credit.insert(txn).await?;

        info!(
            credit = %model.id,
            order = %order.id,
            pending = %model.pending_balance,
            "credit opened"
        );
        Ok(model)
    }

    /// Finds an order by id.
    pub async fn find(&self, id: Uuid) -> Result<sale_orders::Model, SaleOrderError> {
        sale_orders::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SaleOrderError::NotFound(id))
    }

    /// Lists orders for a site in a date range, newest first.
    pub async fn list(
        &self,
        site_id: Option<Uuid>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<sale_orders::Model>, u64), SaleOrderError> {
        let mut query = sale_orders::Entity::find();
        if let Some(site) = site_id {
            query = query.filter(sale_orders::Column::SiteId.eq(site));
        }
        if let Some(from) = from {
            query = query.filter(sale_orders::Column::IssuedOn.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(sale_orders::Column::IssuedOn.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(sale_orders::Column::IssuedOn)
            .order_by_desc(sale_orders::Column::OrderNumber)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((items, total))
    }
}
