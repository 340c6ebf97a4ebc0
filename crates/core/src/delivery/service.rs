//! Delivery batch service.
//!
//! Expected amounts are always re-derived from the current claims and
//! expenses, never accumulated, so repeated recomputation after any
//! sequence of mutations lands on the same figure.

use rust_decimal::Decimal;
use tesoro_shared::types::round_money;

use super::error::DeliveryError;
use super::types::{Confirmation, DeclaredAmounts, DeliveryStatus, ExpectedBreakdown, LineAmount};
use crate::reconciliation::types::ClaimTarget;

/// Stateless service driving the batch state machine.
pub struct DeliveryService;

impl DeliveryService {
    /// The amount a cash order contributes to a batch: its total net of
    /// sales returns, floored at zero.
    #[must_use]
    pub fn net_order_amount(order_total: Decimal, returns_total: Decimal) -> Decimal {
        round_money((order_total - returns_total).max(Decimal::ZERO))
    }

    /// Derives the expected amount from the current claims and expenses.
    ///
    /// `expected = sum(claimed cash orders) + sum(claimed installments)
    /// - sum(attached expenses)`. Idempotent: the same inputs always
    /// produce the same breakdown.
    #[must_use]
    pub fn expected_amount(lines: &[LineAmount], expenses: &[Decimal]) -> ExpectedBreakdown {
        let order_total: Decimal = lines
            .iter()
            .filter(|line| matches!(line.target, ClaimTarget::CashOrder(_)))
            .map(|line| line.amount)
            .sum();
        let payment_total: Decimal = lines
            .iter()
            .filter(|line| matches!(line.target, ClaimTarget::Installment(_)))
            .map(|line| line.amount)
            .sum();
        let expense_total: Decimal = expenses.iter().copied().sum();

        ExpectedBreakdown {
            order_total: round_money(order_total),
            payment_total: round_money(payment_total),
            expense_total: round_money(expense_total),
            expected: round_money(order_total + payment_total - expense_total),
        }
    }

    /// Checks that a batch may still be mutated.
    ///
    /// # Errors
    ///
    /// Returns `BatchNotDraft` once confirmed.
    pub fn validate_mutable(status: DeliveryStatus) -> Result<(), DeliveryError> {
        if status.is_mutable() {
            Ok(())
        } else {
            Err(DeliveryError::BatchNotDraft)
        }
    }

    /// Checks that a batch may be deleted. Only drafts can go.
    ///
    /// # Errors
    ///
    /// Returns `BatchNotDraft` once confirmed.
    pub fn validate_deletable(status: DeliveryStatus) -> Result<(), DeliveryError> {
        Self::validate_mutable(status)
    }

    /// Confirms a batch: computes the declared total and the variance
    /// against the expected amount.
    ///
    /// The variance is reported exactly as computed, including negative
    /// values; it is never silently corrected.
    ///
    /// # Errors
    ///
    /// - `AlreadyConfirmed` when confirmation is attempted twice
    /// - `EmptyBatch` when the batch has zero line items and zero
    ///   expenses
    pub fn confirm(
        status: DeliveryStatus,
        line_item_count: usize,
        expense_count: usize,
        expected: Decimal,
        declared: &DeclaredAmounts,
    ) -> Result<Confirmation, DeliveryError> {
        if status == DeliveryStatus::Confirmed {
            return Err(DeliveryError::AlreadyConfirmed);
        }
        if line_item_count == 0 && expense_count == 0 {
            return Err(DeliveryError::EmptyBatch);
        }

        let declared_total = round_money(declared.total());
        Ok(Confirmation {
            declared_total,
            variance: round_money(declared_total - expected),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order_line(amount: Decimal) -> LineAmount {
        LineAmount {
            target: ClaimTarget::CashOrder(Uuid::new_v4()),
            amount,
        }
    }

    fn payment_line(amount: Decimal) -> LineAmount {
        LineAmount {
            target: ClaimTarget::Installment(Uuid::new_v4()),
            amount,
        }
    }

    #[test]
    fn test_expected_amount_breakdown() {
        let lines = vec![
            order_line(dec!(50000)),
            order_line(dec!(30000)),
            payment_line(dec!(120000)),
        ];
        let expenses = vec![dec!(15000), dec!(5000)];

        let breakdown = DeliveryService::expected_amount(&lines, &expenses);
        assert_eq!(breakdown.order_total, dec!(80000.00));
        assert_eq!(breakdown.payment_total, dec!(120000.00));
        assert_eq!(breakdown.expense_total, dec!(20000.00));
        assert_eq!(breakdown.expected, dec!(180000.00));
    }

    #[test]
    fn test_expected_amount_empty_batch() {
        let breakdown = DeliveryService::expected_amount(&[], &[]);
        assert_eq!(breakdown.expected, dec!(0.00));
    }

    #[test]
    fn test_expected_amount_recompute_idempotent() {
        let lines = vec![order_line(dec!(33333.33)), payment_line(dec!(66666.67))];
        let expenses = vec![dec!(10000)];

        let first = DeliveryService::expected_amount(&lines, &expenses);
        let second = DeliveryService::expected_amount(&lines, &expenses);
        assert_eq!(first, second);
    }

    #[test]
    fn test_expected_can_go_negative() {
        // Expenses larger than takings: variance arithmetic still holds.
        let breakdown = DeliveryService::expected_amount(
            &[order_line(dec!(10000))],
            &[dec!(25000)],
        );
        assert_eq!(breakdown.expected, dec!(-15000.00));
    }

    #[test]
    fn test_net_order_amount() {
        assert_eq!(
            DeliveryService::net_order_amount(dec!(50000), dec!(8000)),
            dec!(42000.00)
        );
        assert_eq!(
            DeliveryService::net_order_amount(dec!(50000), Decimal::ZERO),
            dec!(50000.00)
        );
        // Returns exceeding the order floor at zero.
        assert_eq!(
            DeliveryService::net_order_amount(dec!(50000), dec!(60000)),
            dec!(0.00)
        );
    }

    #[test]
    fn test_confirm_records_negative_variance() {
        // Scenario: expected 200,000; declared 150,000 cash + 40,000
        // transfer; variance is -10,000 and stays -10,000.
        let declared = DeclaredAmounts {
            cash: dec!(150000),
            transfer: dec!(40000),
            check: Decimal::ZERO,
            deposit: Decimal::ZERO,
        };

        let confirmation =
            DeliveryService::confirm(DeliveryStatus::Draft, 3, 0, dec!(200000), &declared)
                .unwrap();
        assert_eq!(confirmation.declared_total, dec!(190000.00));
        assert_eq!(confirmation.variance, dec!(-10000.00));
    }

    #[test]
    fn test_confirm_exact_match_zero_variance() {
        let declared = DeclaredAmounts {
            cash: dec!(200000),
            ..DeclaredAmounts::default()
        };
        let confirmation =
            DeliveryService::confirm(DeliveryStatus::Draft, 1, 0, dec!(200000), &declared)
                .unwrap();
        assert_eq!(confirmation.variance, dec!(0.00));
    }

    #[test]
    fn test_confirm_surplus_variance() {
        let declared = DeclaredAmounts {
            cash: dec!(205000),
            ..DeclaredAmounts::default()
        };
        let confirmation =
            DeliveryService::confirm(DeliveryStatus::Draft, 1, 0, dec!(200000), &declared)
                .unwrap();
        assert_eq!(confirmation.variance, dec!(5000.00));
    }

    #[test]
    fn test_confirm_empty_batch_rejected() {
        let result = DeliveryService::confirm(
            DeliveryStatus::Draft,
            0,
            0,
            Decimal::ZERO,
            &DeclaredAmounts::default(),
        );
        assert!(matches!(result, Err(DeliveryError::EmptyBatch)));
    }

    #[test]
    fn test_confirm_expense_only_batch_allowed() {
        let result = DeliveryService::confirm(
            DeliveryStatus::Draft,
            0,
            2,
            dec!(-20000),
            &DeclaredAmounts::default(),
        );
        assert!(result.is_ok());
        assert_eq!(result.unwrap().variance, dec!(20000.00));
    }

    #[test]
    fn test_second_confirm_rejected() {
        let declared = DeclaredAmounts {
            cash: dec!(100),
            ..DeclaredAmounts::default()
        };
        let result =
            DeliveryService::confirm(DeliveryStatus::Confirmed, 1, 0, dec!(100), &declared);
        assert!(matches!(result, Err(DeliveryError::AlreadyConfirmed)));
    }

    #[test]
    fn test_mutation_guards() {
        assert!(DeliveryService::validate_mutable(DeliveryStatus::Draft).is_ok());
        assert!(matches!(
            DeliveryService::validate_mutable(DeliveryStatus::Confirmed),
            Err(DeliveryError::BatchNotDraft)
        ));
        assert!(DeliveryService::validate_deletable(DeliveryStatus::Draft).is_ok());
        assert!(DeliveryService::validate_deletable(DeliveryStatus::Confirmed).is_err());
    }
}
