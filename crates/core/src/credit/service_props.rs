//! Property-based tests for the credit service.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tesoro_shared::types::{balance_epsilon, is_settled};
use uuid::Uuid;

use super::error::CreditError;
use super::service::CreditService;
use super::types::{CreditSnapshot, CreditStatus};

/// Strategy to generate monetary amounts (0.01 to 10,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate small withholding amounts.
fn withholding() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn open_credit(total: Decimal, source: Decimal, ica: Decimal) -> CreditSnapshot {
    CreditSnapshot {
        id: Uuid::new_v4(),
        status: CreditStatus::Open,
        credit_total: total,
        source_withholding: source,
        ica_withholding: ica,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance invariant holds for any inputs:
    /// `pending = credit_total - paid_total - source - ica`.
    #[test]
    fn prop_balance_invariant(
        total in amount(),
        paid in withholding(),
        source in withholding(),
        ica in withholding(),
    ) {
        let pending = CreditService::pending_balance(total, paid, source, ica);
        prop_assert_eq!(pending, total - paid - source - ica);
    }

    /// A payment closes the credit if and only if the recomputed pending
    /// balance is within the monetary epsilon.
    #[test]
    fn prop_closes_iff_settled(
        total in amount(),
        payment in amount(),
    ) {
        prop_assume!(payment <= total + balance_epsilon());
        let credit = open_credit(total, Decimal::ZERO, Decimal::ZERO);

        let outcome = CreditService::settle_payment(&credit, Decimal::ZERO, payment).unwrap();
        prop_assert_eq!(outcome.closes_credit, is_settled(outcome.pending_balance));
        prop_assert_eq!(
            outcome.status == CreditStatus::Closed,
            outcome.closes_credit
        );
    }

    /// Any payment that would drive the balance negative beyond the
    /// epsilon is rejected, and rejection never alters the inputs.
    #[test]
    fn prop_overpayment_always_rejected(
        total in amount(),
        excess in amount(),
    ) {
        let credit = open_credit(total, Decimal::ZERO, Decimal::ZERO);
        let attempted = total + balance_epsilon() + excess;

        let result = CreditService::settle_payment(&credit, Decimal::ZERO, attempted);
        let is_overpayment_rejected = matches!(result, Err(CreditError::OverpaymentRejected { .. }));
        prop_assert!(is_overpayment_rejected);
    }

    /// Rebuilding from the full payment list reproduces the balance that
    /// sequential settlement arrived at.
    #[test]
    fn prop_rebuild_matches_sequential_settlement(
        total in amount(),
        fractions in proptest::collection::vec(1u32..100u32, 1..6),
    ) {
        let credit = open_credit(total, Decimal::ZERO, Decimal::ZERO);

        // Split the total into payments proportional to the fractions,
        // leaving any rounding remainder unpaid.
        let fraction_sum: u32 = fractions.iter().sum();
        let mut payments = Vec::with_capacity(fractions.len());
        let mut paid = Decimal::ZERO;
        for f in &fractions {
            let share = (total * Decimal::from(*f) / Decimal::from(fraction_sum * 2))
                .round_dp(2);
            if share > Decimal::ZERO {
                payments.push(share);
                paid += share;
            }
        }
        prop_assume!(!payments.is_empty());
        prop_assume!(paid <= total);

        // Sequential settlement.
        let mut running_paid = Decimal::ZERO;
        let mut last_pending = total;
        for p in &payments {
            let outcome = CreditService::settle_payment(&credit, running_paid, *p).unwrap();
            running_paid = outcome.paid_total;
            last_pending = outcome.pending_balance;
        }

        // Rebuild from scratch.
        let rebuilt = CreditService::rebuild(&credit, &payments);
        prop_assert_eq!(rebuilt.paid_total, running_paid);
        prop_assert_eq!(rebuilt.pending_balance, last_pending);
    }

    /// Applying and removing a withholding restores the pending balance
    /// by exactly the withheld amount.
    #[test]
    fn prop_withholding_reversible(
        total in amount(),
        paid in withholding(),
        source in withholding(),
    ) {
        use super::types::WithholdingUpdate;

        let credit = open_credit(total, Decimal::ZERO, Decimal::ZERO);

        let applied = CreditService::update_withholding(
            &credit,
            paid,
            &WithholdingUpdate {
                source_enabled: true,
                source_amount: source,
                ica_enabled: false,
                ica_amount: Decimal::ZERO,
            },
        )
        .unwrap();

        let removed = CreditService::update_withholding(
            &credit,
            paid,
            &WithholdingUpdate {
                source_enabled: false,
                source_amount: Decimal::ZERO,
                ica_enabled: false,
                ica_amount: Decimal::ZERO,
            },
        )
        .unwrap();

        prop_assert_eq!(removed.pending_balance - applied.pending_balance, source);
    }
}
