//! Delivery batch repository.
//!
//! Drives the cash-delivery state machine: draft assembly, claim and
//! release of cash orders and installment payments, expense attachment,
//! and confirmation. Every mutation locks the batch row, re-derives the
//! expected amount from the current line items and expenses, and relies
//! on the claim guard plus the partial unique indexes on
//! delivery_line_items for at-most-once inclusion.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    FromQueryResult, JoinType, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use tesoro_core::delivery::types::{DeclaredAmounts, LineAmount};
use tesoro_core::delivery::{DeliveryError, DeliveryService};
use tesoro_core::reconciliation::types::{
    CandidateOrder, CandidatePayment, ClaimTarget, ExistingClaim,
};
use tesoro_core::reconciliation::{ReconciliationError, ReconciliationService};

use crate::entities::sea_orm_active_enums::{OrderKind, OrderStatus, PaymentMethod};
use crate::entities::{
    credits, delivery_batches, delivery_line_items, payments, sale_orders, sales_returns,
    site_expenses,
};
use crate::repositories::sales_return::SalesReturnRepository;
use crate::repositories::sequence::{DELIVERY_VOUCHER_SCOPE, SequenceRepository};

/// Error types for delivery batch operations.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryRepoError {
    /// Batch not found.
    #[error("Delivery batch not found: {0}")]
    BatchNotFound(Uuid),

    /// Sale order not found.
    #[error("Sale order not found: {0}")]
    OrderNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Line item not found on this batch.
    #[error("Line item not found: {0}")]
    ItemNotFound(Uuid),

    /// Expense not found.
    #[error("Site expense not found: {0}")]
    ExpenseNotFound(Uuid),

    /// Invalid input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The batch state machine rejected the operation.
    #[error(transparent)]
    Core(#[from] DeliveryError),

    /// The claim guard rejected the operation.
    #[error(transparent)]
    Claim(#[from] ReconciliationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a draft batch.
#[derive(Debug, Clone)]
pub struct CreateBatchInput {
    /// The site settling its takings.
    pub site_id: Uuid,
    /// Responsible cashier.
    pub employee_id: Uuid,
    /// Hand-off date.
    pub delivery_date: NaiveDate,
    /// Start of the settled period.
    pub period_start: NaiveDate,
    /// End of the settled period.
    pub period_end: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// A batch with its line items and attached expenses.
#[derive(Debug, Clone)]
pub struct BatchDetails {
    /// Batch header.
    pub batch: delivery_batches::Model,
    /// Claimed orders and payments, oldest first.
    pub line_items: Vec<delivery_line_items::Model>,
    /// Attached site expenses.
    pub expenses: Vec<site_expenses::Model>,
}

/// A cash order eligible for claiming, with its net amount.
#[derive(Debug, Clone)]
pub struct EligibleOrder {
    /// The order row.
    pub order: sale_orders::Model,
    /// Sum of returns recorded against the order.
    pub returns_total: Decimal,
    /// Order total net of returns, floored at zero.
    pub net_total: Decimal,
}

/// An installment payment eligible for claiming.
#[derive(Debug, Clone, FromQueryResult)]
pub struct EligiblePayment {
    /// The payment ID.
    pub id: Uuid,
    /// The credit the payment belongs to.
    pub credit_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
    /// Date the payment was received.
    pub paid_on: NaiveDate,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Receipt reference.
    pub receipt_ref: Option<String>,
    /// Site of the parent order.
    pub site_id: Uuid,
    /// Human-facing number of the parent order.
    pub order_number: i64,
}

#[derive(Debug, FromQueryResult)]
struct ReturnsByOrderRow {
    sale_order_id: Uuid,
    total: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct PaymentSiteRow {
    site_id: Uuid,
}

/// Delivery batch repository.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    db: DatabaseConnection,
}

impl DeliveryRepository {
    /// Creates a new delivery repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft batch for a site, employee, and period.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the period bounds are inverted.
    pub async fn create_draft(
        &self,
        input: CreateBatchInput,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        if input.period_start > input.period_end {
            return Err(DeliveryRepoError::Validation(
                "period start must not be after period end".to_string(),
            ));
        }

        let now = Utc::now().into();
        let batch = delivery_batches::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(input.site_id),
            employee_id: Set(input.employee_id),
            delivery_date: Set(input.delivery_date),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            status: Set(tesoro_core::delivery::types::DeliveryStatus::Draft.into()),
            expected_amount: Set(Decimal::ZERO),
            expense_total: Set(Decimal::ZERO),
            declared_cash: Set(Decimal::ZERO),
            declared_transfer: Set(Decimal::ZERO),
            declared_check: Set(Decimal::ZERO),
            declared_deposit: Set(Decimal::ZERO),
            declared_total: Set(Decimal::ZERO),
            variance: Set(None),
            voucher_number: Set(None),
            notes: Set(input.notes),
            confirmed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(batch = %batch.id, site = %batch.site_id, "delivery batch drafted");
        Ok(batch)
    }

    /// Finds a batch with its line items and attached expenses.
    pub async fn find_details(&self, id: Uuid) -> Result<BatchDetails, DeliveryRepoError> {
        let batch = delivery_batches::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DeliveryRepoError::BatchNotFound(id))?;
        let line_items = delivery_line_items::Entity::find()
            .filter(delivery_line_items::Column::BatchId.eq(id))
            .order_by_asc(delivery_line_items::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let expenses = site_expenses::Entity::find()
            .filter(site_expenses::Column::BatchId.eq(id))
            .all(&self.db)
            .await?;
        Ok(BatchDetails {
            batch,
            line_items,
            expenses,
        })
    }

    /// Lists batches for a site in a date range, newest first.
    pub async fn list(
        &self,
        site_id: Option<Uuid>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<delivery_batches::Model>, u64), DeliveryRepoError> {
        let mut query = delivery_batches::Entity::find();
        if let Some(site) = site_id {
            query = query.filter(delivery_batches::Column::SiteId.eq(site));
        }
        if let Some(from) = from {
            query = query.filter(delivery_batches::Column::DeliveryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(delivery_batches::Column::DeliveryDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(delivery_batches::Column::DeliveryDate)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((items, total))
    }

    /// Claims a cash order into a draft batch.
    ///
    /// The claimed amount is the order total net of returns at claim
    /// time; the snapshot is what the batch audits against later.
    pub async fn add_order_item(
        &self,
        batch_id: Uuid,
        order_id: Uuid,
    ) -> Result<(delivery_line_items::Model, delivery_batches::Model), DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        ReconciliationService::ensure_mutable(batch.status.clone().into())?;

        let order = sale_orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::OrderNotFound(order_id))?;

        let returns_total = SalesReturnRepository::returns_total(&txn, order_id).await?;
        let net_total = DeliveryService::net_order_amount(order.total, returns_total);

        let target = ClaimTarget::CashOrder(order_id);
        let existing = Self::claims_on(&txn, target).await?;
        let candidate = CandidateOrder {
            id: order.id,
            site_id: order.site_id,
            kind: order.kind.clone().into(),
            status: order.status.clone().into(),
            net_total,
        };
        ReconciliationService::ensure_claimable_order(&candidate, batch.site_id, &existing)?;

        let description = format!("order #{}", order.order_number);
        self.insert_line_item(txn, batch, target, Some(order_id), None, net_total, description)
            .await
    }

    /// Claims an installment payment into a draft batch.
    pub async fn add_payment_item(
        &self,
        batch_id: Uuid,
        payment_id: Uuid,
    ) -> Result<(delivery_line_items::Model, delivery_batches::Model), DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        ReconciliationService::ensure_mutable(batch.status.clone().into())?;

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::PaymentNotFound(payment_id))?;
        let site = payments::Entity::find_by_id(payment_id)
            .select_only()
            .column_as(credits::Column::SiteId, "site_id")
            .join(JoinType::InnerJoin, payments::Relation::Credits.def())
            .into_model::<PaymentSiteRow>()
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::PaymentNotFound(payment_id))?;

        let target = ClaimTarget::Installment(payment_id);
        let existing = Self::claims_on(&txn, target).await?;
        let candidate = CandidatePayment {
            id: payment.id,
            site_id: site.site_id,
            amount: payment.amount,
        };
        ReconciliationService::ensure_claimable_payment(&candidate, batch.site_id, &existing)?;

        let description = payment
            .receipt_ref
            .clone()
            .map_or_else(|| "installment".to_string(), |r| format!("installment {r}"));
        self.insert_line_item(
            txn,
            batch,
            target,
            None,
            Some(payment_id),
            payment.amount,
            description,
        )
        .await
    }

    /// Releases a claim by removing a line item from a draft batch.
    pub async fn remove_item(
        &self,
        batch_id: Uuid,
        item_id: Uuid,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        ReconciliationService::ensure_mutable(batch.status.clone().into())?;

        let item = delivery_line_items::Entity::find_by_id(item_id)
            .filter(delivery_line_items::Column::BatchId.eq(batch_id))
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::ItemNotFound(item_id))?;
        item.delete(&txn).await?;

        let batch = Self::recompute_expected(&txn, batch).await?;
        txn.commit().await?;

        info!(batch = %batch_id, item = %item_id, "claim released");
        Ok(batch)
    }

    /// Attaches an unassigned expense of the batch's site to a draft
    /// batch, netting it from the expected amount.
    pub async fn attach_expense(
        &self,
        batch_id: Uuid,
        expense_id: Uuid,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        ReconciliationService::ensure_mutable(batch.status.clone().into())?;

        let expense = site_expenses::Entity::find_by_id(expense_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::ExpenseNotFound(expense_id))?;
        if expense.site_id != batch.site_id {
            return Err(ReconciliationError::SiteMismatch {
                batch_site: batch.site_id,
                candidate_site: expense.site_id,
            }
            .into());
        }
        if let Some(owner) = expense.batch_id {
            if owner != batch_id {
                return Err(DeliveryRepoError::Validation(format!(
                    "expense {expense_id} is already settled in batch {owner}"
                )));
            }
            // Re-attaching to the same draft is a no-op.
            let batch = Self::recompute_expected(&txn, batch).await?;
            txn.commit().await?;
            return Ok(batch);
        }

        let mut active: site_expenses::ActiveModel = expense.into();
        active.batch_id = Set(Some(batch_id));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let batch = Self::recompute_expected(&txn, batch).await?;
        txn.commit().await?;

        info!(batch = %batch_id, expense = %expense_id, "expense attached");
        Ok(batch)
    }

    /// Detaches an expense from a draft batch, returning it to the
    /// unassigned pool.
    pub async fn detach_expense(
        &self,
        batch_id: Uuid,
        expense_id: Uuid,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        ReconciliationService::ensure_mutable(batch.status.clone().into())?;

        let expense = site_expenses::Entity::find_by_id(expense_id)
            .filter(site_expenses::Column::BatchId.eq(batch_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(DeliveryRepoError::ExpenseNotFound(expense_id))?;

        let mut active: site_expenses::ActiveModel = expense.into();
        active.batch_id = Set(None);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let batch = Self::recompute_expected(&txn, batch).await?;
        txn.commit().await?;

        info!(batch = %batch_id, expense = %expense_id, "expense detached");
        Ok(batch)
    }

    /// Confirms a batch against the cashier's declared amounts.
    ///
    /// Assigns the voucher number from the site counter, records the
    /// variance exactly as computed, and locks the batch forever.
    pub async fn confirm(
        &self,
        batch_id: Uuid,
        declared: DeclaredAmounts,
        notes: Option<String>,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;

        // Re-derive the expected amount under the lock so the confirmed
        // figure matches the line items exactly.
        let batch = Self::recompute_expected(&txn, batch).await?;
        let line_item_count = delivery_line_items::Entity::find()
            .filter(delivery_line_items::Column::BatchId.eq(batch_id))
            .count(&txn)
            .await?;
        let expense_count = site_expenses::Entity::find()
            .filter(site_expenses::Column::BatchId.eq(batch_id))
            .count(&txn)
            .await?;

        let confirmation = DeliveryService::confirm(
            batch.status.clone().into(),
            usize::try_from(line_item_count).unwrap_or(usize::MAX),
            usize::try_from(expense_count).unwrap_or(usize::MAX),
            batch.expected_amount,
            &declared,
        )?;
        let voucher =
            SequenceRepository::next_value(&txn, DELIVERY_VOUCHER_SCOPE, batch.site_id).await?;

        let now = Utc::now().into();
        let mut active: delivery_batches::ActiveModel = batch.into();
        active.status = Set(tesoro_core::delivery::types::DeliveryStatus::Confirmed.into());
        active.declared_cash = Set(declared.cash);
        active.declared_transfer = Set(declared.transfer);
        active.declared_check = Set(declared.check);
        active.declared_deposit = Set(declared.deposit);
        active.declared_total = Set(confirmation.declared_total);
        active.variance = Set(Some(confirmation.variance));
        active.voucher_number = Set(Some(voucher));
        if notes.is_some() {
            active.notes = Set(notes);
        }
        active.confirmed_at = Set(Some(now));
        active.updated_at = Set(now);
        let batch = active.update(&txn).await?;

        txn.commit().await?;

        if confirmation.variance.is_zero() {
            info!(batch = %batch_id, voucher, "delivery batch confirmed");
        } else {
            warn!(
                batch = %batch_id,
                voucher,
                variance = %confirmation.variance,
                "delivery batch confirmed with variance"
            );
        }
        Ok(batch)
    }

    /// Deletes a draft batch, releasing its claims and expenses.
    pub async fn delete_draft(&self, batch_id: Uuid) -> Result<(), DeliveryRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::lock_batch(&txn, batch_id).await?;
        DeliveryService::validate_deletable(batch.status.clone().into())?;

        // Expenses return to the unassigned pool; line items cascade
        // with the batch, releasing their claims.
        let attached = site_expenses::Entity::find()
            .filter(site_expenses::Column::BatchId.eq(batch_id))
            .all(&txn)
            .await?;
        for expense in attached {
            let mut active: site_expenses::ActiveModel = expense.into();
            active.batch_id = Set(None);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }
        delivery_line_items::Entity::delete_many()
            .filter(delivery_line_items::Column::BatchId.eq(batch_id))
            .exec(&txn)
            .await?;
        batch.delete(&txn).await?;

        txn.commit().await?;
        info!(batch = %batch_id, "draft batch deleted");
        Ok(())
    }

    /// Lists finalized cash orders of a site in a period with no live
    /// claim, each with its amount net of returns.
    pub async fn list_eligible_cash_orders(
        &self,
        site_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EligibleOrder>, DeliveryRepoError> {
        let orders = sale_orders::Entity::find()
            .join(
                JoinType::LeftJoin,
                sale_orders::Relation::DeliveryLineItems.def(),
            )
            .filter(delivery_line_items::Column::Id.is_null())
            .filter(sale_orders::Column::SiteId.eq(site_id))
            .filter(sale_orders::Column::Kind.eq(OrderKind::Cash))
            .filter(sale_orders::Column::Status.eq(OrderStatus::Finalized))
            .filter(sale_orders::Column::IssuedOn.gte(from))
            .filter(sale_orders::Column::IssuedOn.lte(to))
            .order_by_asc(sale_orders::Column::IssuedOn)
            .order_by_asc(sale_orders::Column::OrderNumber)
            .all(&self.db)
            .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let returns = sales_returns::Entity::find()
            .select_only()
            .column(sales_returns::Column::SaleOrderId)
            .column_as(sales_returns::Column::Amount.sum(), "total")
            .filter(sales_returns::Column::SaleOrderId.is_in(ids))
            .group_by(sales_returns::Column::SaleOrderId)
            .into_model::<ReturnsByOrderRow>()
            .all(&self.db)
            .await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let returns_total = returns
                    .iter()
                    .find(|r| r.sale_order_id == order.id)
                    .and_then(|r| r.total)
                    .unwrap_or(Decimal::ZERO);
                let net_total = DeliveryService::net_order_amount(order.total, returns_total);
                EligibleOrder {
                    order,
                    returns_total,
                    net_total,
                }
            })
            .collect())
    }

    /// Lists installment payments of a site in a period with no live
    /// claim.
    pub async fn list_eligible_payments(
        &self,
        site_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EligiblePayment>, DeliveryRepoError> {
        Ok(payments::Entity::find()
            .select_only()
            .columns([
                payments::Column::Id,
                payments::Column::CreditId,
                payments::Column::Amount,
                payments::Column::PaidOn,
                payments::Column::Method,
                payments::Column::ReceiptRef,
            ])
            .column_as(credits::Column::SiteId, "site_id")
            .column_as(sale_orders::Column::OrderNumber, "order_number")
            .join(JoinType::InnerJoin, payments::Relation::Credits.def())
            .join(JoinType::InnerJoin, credits::Relation::SaleOrders.def())
            .join(
                JoinType::LeftJoin,
                payments::Relation::DeliveryLineItems.def(),
            )
            .filter(delivery_line_items::Column::Id.is_null())
            .filter(credits::Column::SiteId.eq(site_id))
            .filter(payments::Column::PaidOn.gte(from))
            .filter(payments::Column::PaidOn.lte(to))
            .order_by_asc(payments::Column::PaidOn)
            .into_model::<EligiblePayment>()
            .all(&self.db)
            .await?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn lock_batch(
        txn: &DatabaseTransaction,
        batch_id: Uuid,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        delivery_batches::Entity::find_by_id(batch_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(DeliveryRepoError::BatchNotFound(batch_id))
    }

    /// Live claims on a target across all batches. Line items only exist
    /// for live batches (deleted drafts cascade), so every row counts.
    async fn claims_on(
        txn: &DatabaseTransaction,
        target: ClaimTarget,
    ) -> Result<Vec<ExistingClaim>, DbErr> {
        let query = match target {
            ClaimTarget::CashOrder(id) => delivery_line_items::Entity::find()
                .filter(delivery_line_items::Column::SaleOrderId.eq(id)),
            ClaimTarget::Installment(id) => delivery_line_items::Entity::find()
                .filter(delivery_line_items::Column::PaymentId.eq(id)),
        };
        Ok(query
            .all(txn)
            .await?
            .into_iter()
            .map(|item| ExistingClaim {
                target,
                batch_id: item.batch_id,
            })
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_line_item(
        &self,
        txn: DatabaseTransaction,
        batch: delivery_batches::Model,
        target: ClaimTarget,
        sale_order_id: Option<Uuid>,
        payment_id: Option<Uuid>,
        amount: Decimal,
        description: String,
    ) -> Result<(delivery_line_items::Model, delivery_batches::Model), DeliveryRepoError> {
        let batch_id = batch.id;
        let inserted = delivery_line_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            batch_id: Set(batch_id),
            sale_order_id: Set(sale_order_id),
            payment_id: Set(payment_id),
            amount: Set(amount),
            description: Set(Some(description)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await;

        let item = match inserted {
            Ok(item) => item,
            Err(err) if Self::is_claim_conflict(&err) => {
                // A concurrent claim won the race to the partial unique
                // index. Roll back and report who holds the claim.
                drop(txn);
                return Err(self.already_claimed(target, err).await);
            }
            Err(err) => return Err(err.into()),
        };

        let batch = Self::recompute_expected(&txn, batch).await?;
        txn.commit().await?;

        info!(batch = %batch_id, %target, amount = %amount, "claim recorded");
        Ok((item, batch))
    }

    fn is_claim_conflict(err: &DbErr) -> bool {
        err.to_string().contains("uq_line_items")
    }

    async fn already_claimed(&self, target: ClaimTarget, err: DbErr) -> DeliveryRepoError {
        let query = match target {
            ClaimTarget::CashOrder(id) => delivery_line_items::Entity::find()
                .filter(delivery_line_items::Column::SaleOrderId.eq(id)),
            ClaimTarget::Installment(id) => delivery_line_items::Entity::find()
                .filter(delivery_line_items::Column::PaymentId.eq(id)),
        };
        match query.one(&self.db).await {
            Ok(Some(winner)) => ReconciliationError::AlreadyClaimed {
                target,
                batch_id: winner.batch_id,
            }
            .into(),
            _ => err.into(),
        }
    }

    /// Re-derives and stores the expected amount from the batch's
    /// current line items and attached expenses.
    async fn recompute_expected(
        txn: &DatabaseTransaction,
        batch: delivery_batches::Model,
    ) -> Result<delivery_batches::Model, DeliveryRepoError> {
        let lines: Vec<LineAmount> = delivery_line_items::Entity::find()
            .filter(delivery_line_items::Column::BatchId.eq(batch.id))
            .all(txn)
            .await?
            .into_iter()
            .map(|item| LineAmount {
                target: match (item.sale_order_id, item.payment_id) {
                    (Some(order_id), _) => ClaimTarget::CashOrder(order_id),
                    (None, Some(payment_id)) => ClaimTarget::Installment(payment_id),
                    // Unreachable under the table's check constraint.
                    (None, None) => ClaimTarget::CashOrder(item.id),
                },
                amount: item.amount,
            })
            .collect();
        let expenses: Vec<Decimal> = site_expenses::Entity::find()
            .filter(site_expenses::Column::BatchId.eq(batch.id))
            .all(txn)
            .await?
            .into_iter()
            .map(|e| e.amount)
            .collect();

        let breakdown = DeliveryService::expected_amount(&lines, &expenses);

        let mut active: delivery_batches::ActiveModel = batch.into();
        active.expected_amount = Set(breakdown.expected);
        active.expense_total = Set(breakdown.expense_total);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(txn).await?)
    }
}
