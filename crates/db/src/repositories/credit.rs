//! Credit repository.
//!
//! Every balance mutation locks the credit row for the duration of the
//! recomputation, reads the withholding amounts from the originating
//! order, and recomputes the pending balance from the authoritative SUM
//! over payment rows - never from incremental counters.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use tesoro_shared::types::balance_epsilon;
use tracing::{info, warn};
use uuid::Uuid;

use tesoro_core::credit::types::CreditStatus as CoreCreditStatus;
use tesoro_core::credit::{CreditError, CreditService, CreditSnapshot, OverduePolicy};
use tesoro_core::payment::types::{PaymentInput, PaymentSnapshot};
use tesoro_core::payment::{PaymentError, PaymentService};

use crate::entities::sea_orm_active_enums::{CreditStatus, DeliveryStatus};
use crate::entities::{credits, delivery_batches, delivery_line_items, payments, sale_orders};

/// Error types for credit operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditRepoError {
    /// Credit not found.
    #[error("Credit not found: {0}")]
    NotFound(Uuid),

    /// The originating order disappeared (data corruption).
    #[error("Sale order not found for credit: {0}")]
    OrderNotFound(Uuid),

    /// Payment not found on this credit.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Balance arithmetic rejected the mutation.
    #[error(transparent)]
    Core(#[from] CreditError),

    /// Payment validation rejected the mutation.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a withholding update on a credit's originating order.
#[derive(Debug, Clone)]
pub struct UpdateWithholdingInput {
    /// Whether source retention applies.
    pub source_enabled: bool,
    /// Source retention percentage recorded on the order.
    pub source_percent: Decimal,
    /// Source retention amount.
    pub source_amount: Decimal,
    /// Whether ICA retention applies.
    pub ica_enabled: bool,
    /// ICA retention percentage recorded on the order.
    pub ica_percent: Decimal,
    /// ICA retention amount.
    pub ica_amount: Decimal,
}

/// A credit with its payment history.
#[derive(Debug, Clone)]
pub struct CreditWithPayments {
    /// Credit header.
    pub credit: credits::Model,
    /// Payments, oldest first.
    pub payments: Vec<payments::Model>,
}

#[derive(Debug, FromQueryResult)]
struct PaidTotalRow {
    total: Option<Decimal>,
}

/// Credit repository for balance-bearing operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    db: DatabaseConnection,
}

impl CreditRepository {
    /// Creates a new credit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a credit with its payment history.
    pub async fn find_with_payments(&self, id: Uuid) -> Result<CreditWithPayments, CreditRepoError> {
        let credit = credits::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CreditRepoError::NotFound(id))?;
        let payments = payments::Entity::find()
            .filter(payments::Column::CreditId.eq(id))
            .order_by_asc(payments::Column::PaidOn)
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(CreditWithPayments { credit, payments })
    }

    /// Lists credits filtered by client, site, and status.
    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        site_id: Option<Uuid>,
        status: Option<CoreCreditStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<credits::Model>, u64), CreditRepoError> {
        let mut query = credits::Entity::find();
        if let Some(client) = client_id {
            query = query.filter(credits::Column::ClientId.eq(client));
        }
        if let Some(site) = site_id {
            query = query.filter(credits::Column::SiteId.eq(site));
        }
        if let Some(status) = status {
            query = query.filter(credits::Column::Status.eq(CreditStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(credits::Column::OpenedOn)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((items, total))
    }

    /// Registers one installment against a credit.
    ///
    /// Locks the credit row, recomputes the balance from the payment
    /// sum, appends the payment with its balance snapshot, and persists
    /// the new credit state - all in one transaction.
    pub async fn register_payment(
        &self,
        credit_id: Uuid,
        input: PaymentInput,
    ) -> Result<(payments::Model, credits::Model), CreditRepoError> {
        let txn = self.db.begin().await?;

        let credit = Self::lock_credit(&txn, credit_id).await?;
        let order = Self::find_order(&txn, &credit).await?;
        let paid_total = Self::paid_total(&txn, credit_id, None).await?;

        let snapshot = Self::snapshot(&credit, &order);
        let outcome = PaymentService::register(&snapshot, paid_total, &input)?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            credit_id: Set(credit_id),
            amount: Set(input.amount),
            paid_on: Set(input.paid_on),
            method: Set(input.method.into()),
            receipt_ref: Set(input.receipt_ref.clone()),
            balance_after: Set(outcome.pending_balance),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: credits::ActiveModel = credit.into();
        active.paid_total = Set(outcome.paid_total);
        active.pending_balance = Set(outcome.pending_balance);
        active.status = Set(outcome.status.into());
        if outcome.closes_credit {
            active.closed_on = Set(Some(input.paid_on));
        }
        active.updated_at = Set(now);
        let credit = active.update(&txn).await?;

        txn.commit().await?;

        if outcome.closes_credit {
            info!(credit = %credit_id, "credit settled in full");
        } else {
            info!(
                credit = %credit_id,
                pending = %outcome.pending_balance,
                "installment registered"
            );
        }
        Ok((payment, credit))
    }

    /// Amends a payment amount and rebuilds the credit balance.
    ///
    /// Rejected once a confirmed delivery batch owns the payment.
    pub async fn amend_payment(
        &self,
        credit_id: Uuid,
        payment_id: Uuid,
        new_amount: Decimal,
    ) -> Result<(payments::Model, credits::Model), CreditRepoError> {
        let txn = self.db.begin().await?;

        let credit = Self::lock_credit(&txn, credit_id).await?;
        let order = Self::find_order(&txn, &credit).await?;
        let payment = payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::CreditId.eq(credit_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CreditRepoError::PaymentNotFound(payment_id))?;

        let claimed = Self::claimed_by_confirmed_batch(&txn, payment_id).await?;
        PaymentService::validate_amendment(
            &PaymentSnapshot {
                id: payment.id,
                amount: payment.amount,
                claimed_by_confirmed_batch: claimed,
            },
            new_amount,
        )?;

        let other_paid = Self::paid_total(&txn, credit_id, Some(payment_id)).await?;
        let snapshot = Self::snapshot(&credit, &order);
        let state = CreditService::rebuild(&snapshot, &[other_paid, new_amount]);
        if state.pending_balance < -balance_epsilon() {
            return Err(CreditError::OverpaymentRejected {
                pending: credit.pending_balance,
                attempted: new_amount,
            }
            .into());
        }

        let now = Utc::now().into();
        let mut payment_active: payments::ActiveModel = payment.into();
        payment_active.amount = Set(new_amount);
        payment_active.balance_after = Set(state.pending_balance);
        payment_active.updated_at = Set(now);
        let payment = payment_active.update(&txn).await?;

        let credit = Self::apply_balance_state(&txn, credit, &state, now).await?;

        txn.commit().await?;
        info!(
            credit = %credit_id,
            payment = %payment_id,
            "payment amended, balance rebuilt"
        );
        Ok((payment, credit))
    }

    /// Applies a withholding change to the originating order and
    /// recomputes the credit balance.
    pub async fn update_withholding(
        &self,
        credit_id: Uuid,
        input: UpdateWithholdingInput,
    ) -> Result<credits::Model, CreditRepoError> {
        let txn = self.db.begin().await?;

        let credit = Self::lock_credit(&txn, credit_id).await?;
        let order = Self::find_order(&txn, &credit).await?;
        let paid_total = Self::paid_total(&txn, credit_id, None).await?;

        let snapshot = Self::snapshot(&credit, &order);
        let state = CreditService::update_withholding(
            &snapshot,
            paid_total,
            &tesoro_core::credit::types::WithholdingUpdate {
                source_enabled: input.source_enabled,
                source_amount: input.source_amount,
                ica_enabled: input.ica_enabled,
                ica_amount: input.ica_amount,
            },
        )?;

        let now = Utc::now().into();
        let mut order_active: sale_orders::ActiveModel = order.into();
        order_active.source_retention_enabled = Set(input.source_enabled);
        order_active.source_retention_percent = Set(input.source_percent);
        order_active.source_retention_amount = Set(input.source_amount);
        order_active.ica_retention_enabled = Set(input.ica_enabled);
        order_active.ica_retention_percent = Set(input.ica_percent);
        order_active.ica_retention_amount = Set(input.ica_amount);
        order_active.updated_at = Set(now);
        order_active.update(&txn).await?;

        let credit = Self::apply_balance_state(&txn, credit, &state, now).await?;

        txn.commit().await?;
        info!(
            credit = %credit_id,
            pending = %state.pending_balance,
            "withholding updated"
        );
        Ok(credit)
    }

    /// Voids a credit, freezing its balance.
    pub async fn void(&self, credit_id: Uuid) -> Result<credits::Model, CreditRepoError> {
        let txn = self.db.begin().await?;

        let credit = Self::lock_credit(&txn, credit_id).await?;
        let order = Self::find_order(&txn, &credit).await?;
        let status = CreditService::void(&Self::snapshot(&credit, &order))?;

        let mut active: credits::ActiveModel = credit.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let credit = active.update(&txn).await?;

        txn.commit().await?;
        warn!(credit = %credit_id, "credit voided");
        Ok(credit)
    }

    /// Rebuilds the stored balance from the full payment history.
    ///
    /// Must reproduce the stored pending balance when no drift exists;
    /// repairs it otherwise.
    pub async fn rebuild(&self, credit_id: Uuid) -> Result<credits::Model, CreditRepoError> {
        let txn = self.db.begin().await?;

        let credit = Self::lock_credit(&txn, credit_id).await?;
        let order = Self::find_order(&txn, &credit).await?;
        let amounts: Vec<Decimal> = payments::Entity::find()
            .filter(payments::Column::CreditId.eq(credit_id))
            .order_by_asc(payments::Column::CreatedAt)
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| p.amount)
            .collect();

        let stored_pending = credit.pending_balance;
        let state = CreditService::rebuild(&Self::snapshot(&credit, &order), &amounts);
        if state.pending_balance != stored_pending {
            warn!(
                credit = %credit_id,
                stored = %stored_pending,
                rebuilt = %state.pending_balance,
                "balance drift repaired"
            );
        }

        let credit =
            Self::apply_balance_state(&txn, credit, &state, Utc::now().into()).await?;
        txn.commit().await?;
        Ok(credit)
    }

    /// Applies the overdue policy to open credits, optionally scoped to
    /// one site. Returns the number of credits marked overdue.
    pub async fn overdue_sweep(
        &self,
        policy: OverduePolicy,
        as_of: NaiveDate,
        site_id: Option<Uuid>,
    ) -> Result<u64, CreditRepoError> {
        let txn = self.db.begin().await?;

        let mut query = credits::Entity::find()
            .filter(credits::Column::Status.eq(CreditStatus::Open))
            .lock_exclusive();
        if let Some(site) = site_id {
            query = query.filter(credits::Column::SiteId.eq(site));
        }
        let open_credits = query.all(&txn).await?;

        let mut marked = 0u64;
        let now = Utc::now().into();
        for credit in open_credits {
            let Some(new_status) =
                policy.sweep_status(credit.status.clone().into(), credit.opened_on, as_of)
            else {
                continue;
            };
            let mut active: credits::ActiveModel = credit.into();
            active.status = Set(new_status.into());
            active.updated_at = Set(now);
            active.update(&txn).await?;
            marked += 1;
        }

        txn.commit().await?;
        if marked > 0 {
            info!(count = marked, "credits marked overdue");
        }
        Ok(marked)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn lock_credit(
        txn: &DatabaseTransaction,
        credit_id: Uuid,
    ) -> Result<credits::Model, CreditRepoError> {
        credits::Entity::find_by_id(credit_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(CreditRepoError::NotFound(credit_id))
    }

    async fn find_order(
        txn: &DatabaseTransaction,
        credit: &credits::Model,
    ) -> Result<sale_orders::Model, CreditRepoError> {
        sale_orders::Entity::find_by_id(credit.sale_order_id)
            .one(txn)
            .await?
            .ok_or(CreditRepoError::OrderNotFound(credit.id))
    }

    fn snapshot(credit: &credits::Model, order: &sale_orders::Model) -> CreditSnapshot {
        CreditSnapshot {
            id: credit.id,
            status: credit.status.clone().into(),
            credit_total: credit.credit_total,
            source_withholding: order.source_retention_amount,
            ica_withholding: order.ica_retention_amount,
        }
    }

    /// Authoritative sum of payment amounts, optionally excluding one
    /// payment (for amendments).
    async fn paid_total<C: ConnectionTrait>(
        conn: &C,
        credit_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Decimal, DbErr> {
        let mut query = payments::Entity::find()
            .select_only()
            .column_as(payments::Column::Amount.sum(), "total")
            .filter(payments::Column::CreditId.eq(credit_id));
        if let Some(id) = exclude {
            query = query.filter(payments::Column::Id.ne(id));
        }
        let row = query.into_model::<PaidTotalRow>().one(conn).await?;
        Ok(row.and_then(|r| r.total).unwrap_or(Decimal::ZERO))
    }

    async fn claimed_by_confirmed_batch<C: ConnectionTrait>(
        conn: &C,
        payment_id: Uuid,
    ) -> Result<bool, DbErr> {
        let count = delivery_line_items::Entity::find()
            .filter(delivery_line_items::Column::PaymentId.eq(payment_id))
            .inner_join(delivery_batches::Entity)
            .filter(delivery_batches::Column::Status.eq(DeliveryStatus::Confirmed))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    async fn apply_balance_state(
        txn: &DatabaseTransaction,
        credit: credits::Model,
        state: &tesoro_core::credit::types::BalanceState,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> Result<credits::Model, CreditRepoError> {
        let was_closed = credit.closed_on.is_some();
        let mut active: credits::ActiveModel = credit.into();
        active.paid_total = Set(state.paid_total);
        active.pending_balance = Set(state.pending_balance);
        active.status = Set(state.status.into());
        match state.status {
            CoreCreditStatus::Closed if !was_closed => {
                active.closed_on = Set(Some(now.date_naive()));
            }
            CoreCreditStatus::Open | CoreCreditStatus::Overdue => {
                active.closed_on = Set(None);
            }
            _ => {}
        }
        active.updated_at = Set(now);
        Ok(active.update(txn).await?)
    }
}
