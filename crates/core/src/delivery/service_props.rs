//! Property-based tests for the delivery batch service.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::DeliveryService;
use super::types::{DeclaredAmounts, DeliveryStatus, LineAmount};
use crate::reconciliation::types::ClaimTarget;

/// Strategy to generate monetary amounts (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a claimed line, order or installment.
fn line() -> impl Strategy<Value = LineAmount> {
    (amount(), any::<bool>()).prop_map(|(amount, is_order)| LineAmount {
        target: if is_order {
            ClaimTarget::CashOrder(Uuid::new_v4())
        } else {
            ClaimTarget::Installment(Uuid::new_v4())
        },
        amount,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The expected amount is exactly orders + payments - expenses.
    #[test]
    fn prop_expected_is_sum_of_parts(
        lines in proptest::collection::vec(line(), 0..12),
        expenses in proptest::collection::vec(amount(), 0..6),
    ) {
        let breakdown = DeliveryService::expected_amount(&lines, &expenses);

        prop_assert_eq!(
            breakdown.expected,
            breakdown.order_total + breakdown.payment_total - breakdown.expense_total
        );

        let manual_orders: Decimal = lines
            .iter()
            .filter(|l| matches!(l.target, ClaimTarget::CashOrder(_)))
            .map(|l| l.amount)
            .sum();
        prop_assert_eq!(breakdown.order_total, manual_orders);
    }

    /// Recomputation is idempotent for any claim/expense set.
    #[test]
    fn prop_recompute_idempotent(
        lines in proptest::collection::vec(line(), 0..12),
        expenses in proptest::collection::vec(amount(), 0..6),
    ) {
        let first = DeliveryService::expected_amount(&lines, &expenses);
        let second = DeliveryService::expected_amount(&lines, &expenses);
        prop_assert_eq!(first, second);
    }

    /// `variance = declared_total - expected` exactly, including
    /// negative values, for any declared breakdown.
    #[test]
    fn prop_variance_is_exact_difference(
        expected in amount(),
        cash in amount(),
        transfer in amount(),
        check in amount(),
        deposit in amount(),
    ) {
        let declared = DeclaredAmounts { cash, transfer, check, deposit };

        let confirmation =
            DeliveryService::confirm(DeliveryStatus::Draft, 1, 0, expected, &declared).unwrap();

        prop_assert_eq!(
            confirmation.variance,
            confirmation.declared_total - expected
        );
        prop_assert_eq!(
            confirmation.declared_total,
            cash + transfer + check + deposit
        );
    }

    /// Confirming a confirmed batch always fails and never yields a
    /// confirmation, whatever the declared amounts.
    #[test]
    fn prop_second_confirm_always_rejected(
        expected in amount(),
        cash in amount(),
    ) {
        let declared = DeclaredAmounts { cash, ..DeclaredAmounts::default() };
        let result =
            DeliveryService::confirm(DeliveryStatus::Confirmed, 5, 2, expected, &declared);
        prop_assert!(result.is_err());
    }

    /// Net order amounts never go negative, whatever the returns.
    #[test]
    fn prop_net_order_amount_floored(
        total in amount(),
        returns in amount(),
    ) {
        let net = DeliveryService::net_order_amount(total, returns);
        prop_assert!(net >= Decimal::ZERO);
        prop_assert!(net <= total);
    }
}
