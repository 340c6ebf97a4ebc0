//! Credit service for lifecycle transitions and balance recomputation.
//!
//! All balance mutations are computed from authoritative sums of payment
//! records, never from incremental counters, so concurrent callers racing
//! on stale in-memory state cannot introduce drift. The repository layer
//! serializes mutations with row locks and feeds this service fresh sums.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tesoro_shared::types::{balance_epsilon, is_settled, round_money};

use super::error::CreditError;
use super::types::{
    BalanceState, CreditSnapshot, CreditStatus, NewCredit, OrderKind, OrderSnapshot, OrderStatus,
    PaymentOutcome, WithholdingUpdate,
};

/// Stateless service owning the credit balance invariant.
pub struct CreditService;

impl CreditService {
    /// Recomputes a pending balance from scratch.
    ///
    /// `pending = credit_total - paid_total - source_withholding - ica_withholding`
    #[must_use]
    pub fn pending_balance(
        credit_total: Decimal,
        paid_total: Decimal,
        source_withholding: Decimal,
        ica_withholding: Decimal,
    ) -> Decimal {
        round_money(credit_total - paid_total - source_withholding - ica_withholding)
    }

    /// Opens a credit for a finalized credit-kind sale order.
    ///
    /// The initial pending balance is the order total minus any
    /// withholding already known on the order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderState` if the order is not a finalized
    /// credit-kind sale or already owns a credit.
    pub fn open_credit(order: &OrderSnapshot, opened_on: NaiveDate) -> Result<NewCredit, CreditError> {
        if order.kind != OrderKind::Credit {
            return Err(CreditError::InvalidOrderState(format!(
                "order {} is a {} sale, not a credit sale",
                order.id, order.kind
            )));
        }
        if order.status != OrderStatus::Finalized {
            return Err(CreditError::InvalidOrderState(format!(
                "order {} is {}, only finalized orders open credits",
                order.id, order.status
            )));
        }
        if order.has_credit {
            return Err(CreditError::InvalidOrderState(format!(
                "order {} already has a credit",
                order.id
            )));
        }

        let pending = Self::pending_balance(
            order.total,
            Decimal::ZERO,
            order.source_withholding,
            order.ica_withholding,
        );

        Ok(NewCredit {
            order_id: order.id,
            credit_total: order.total,
            pending_balance: pending,
            status: if is_settled(pending) {
                // A fully-withheld order opens already settled.
                CreditStatus::Closed
            } else {
                CreditStatus::Open
            },
            opened_on,
        })
    }

    /// Settles one payment against a credit.
    ///
    /// `paid_total` is the authoritative sum of existing payment rows,
    /// excluding the payment being settled. The credit transitions to
    /// `Closed` exactly when the recomputed pending balance falls within
    /// the monetary epsilon.
    ///
    /// # Errors
    ///
    /// - `CreditVoided` when the credit's balance is frozen
    /// - `InvalidOrderState` when the credit is already closed
    /// - `OverpaymentRejected` when the payment would drive the balance
    ///   negative beyond the epsilon (rejected, never clamped)
    pub fn settle_payment(
        credit: &CreditSnapshot,
        paid_total: Decimal,
        amount: Decimal,
    ) -> Result<PaymentOutcome, CreditError> {
        match credit.status {
            CreditStatus::Voided => return Err(CreditError::CreditVoided(credit.id)),
            CreditStatus::Closed => {
                return Err(CreditError::InvalidOrderState(format!(
                    "credit {} is already closed",
                    credit.id
                )));
            }
            CreditStatus::Open | CreditStatus::Overdue => {}
        }

        let pending_before = Self::pending_balance(
            credit.credit_total,
            paid_total,
            credit.source_withholding,
            credit.ica_withholding,
        );
        let new_paid_total = round_money(paid_total + amount);
        let pending_after = Self::pending_balance(
            credit.credit_total,
            new_paid_total,
            credit.source_withholding,
            credit.ica_withholding,
        );

        if pending_after < -balance_epsilon() {
            return Err(CreditError::OverpaymentRejected {
                pending: pending_before,
                attempted: amount,
            });
        }

        let closes = is_settled(pending_after);
        Ok(PaymentOutcome {
            paid_total: new_paid_total,
            pending_balance: pending_after,
            status: if closes {
                CreditStatus::Closed
            } else {
                credit.status
            },
            closes_credit: closes,
        })
    }

    /// Applies a withholding change and recomputes the balance.
    ///
    /// Disabling a previously-enabled withholding restores the pending
    /// balance by exactly the removed amount. A credit closed by a
    /// withholding whose removal leaves a positive balance reopens.
    ///
    /// # Errors
    ///
    /// - `InvalidWithholding` when a nonzero amount accompanies a
    ///   disabled flag or an amount is negative
    /// - `CreditVoided` when the balance is frozen
    pub fn update_withholding(
        credit: &CreditSnapshot,
        paid_total: Decimal,
        update: &WithholdingUpdate,
    ) -> Result<BalanceState, CreditError> {
        if credit.status == CreditStatus::Voided {
            return Err(CreditError::CreditVoided(credit.id));
        }
        if !update.source_enabled && !update.source_amount.is_zero() {
            return Err(CreditError::InvalidWithholding(
                "source amount supplied while source retention is disabled".to_string(),
            ));
        }
        if !update.ica_enabled && !update.ica_amount.is_zero() {
            return Err(CreditError::InvalidWithholding(
                "ICA amount supplied while ICA retention is disabled".to_string(),
            ));
        }
        if update.source_amount.is_sign_negative() || update.ica_amount.is_sign_negative() {
            return Err(CreditError::InvalidWithholding(
                "withholding amounts cannot be negative".to_string(),
            ));
        }

        let pending = Self::pending_balance(
            credit.credit_total,
            paid_total,
            update.source_amount,
            update.ica_amount,
        );

        Ok(BalanceState {
            paid_total,
            pending_balance: pending,
            status: Self::status_for_balance(credit.status, pending),
        })
    }

    /// Voids a credit, freezing its balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderState` when the credit is already voided.
    pub fn void(credit: &CreditSnapshot) -> Result<CreditStatus, CreditError> {
        if credit.status == CreditStatus::Voided {
            return Err(CreditError::InvalidOrderState(format!(
                "credit {} is already voided",
                credit.id
            )));
        }
        Ok(CreditStatus::Voided)
    }

    /// Rebuilds the balance from the full list of payment amounts.
    ///
    /// Must reproduce the stored pending balance exactly for any payment
    /// history; used to detect and repair drift.
    #[must_use]
    pub fn rebuild(
        credit: &CreditSnapshot,
        payment_amounts: &[Decimal],
    ) -> BalanceState {
        let paid_total = round_money(payment_amounts.iter().copied().sum());
        let pending = Self::pending_balance(
            credit.credit_total,
            paid_total,
            credit.source_withholding,
            credit.ica_withholding,
        );

        BalanceState {
            paid_total,
            pending_balance: pending,
            status: Self::status_for_balance(credit.status, pending),
        }
    }

    /// Derives the lifecycle state implied by a recomputed balance.
    ///
    /// Voided stays voided. A settled balance closes the credit; an
    /// outstanding balance reopens a closed one.
    fn status_for_balance(current: CreditStatus, pending: Decimal) -> CreditStatus {
        match current {
            CreditStatus::Voided => CreditStatus::Voided,
            _ if is_settled(pending) => CreditStatus::Closed,
            CreditStatus::Closed => CreditStatus::Open,
            other => other,
        }
    }
}
