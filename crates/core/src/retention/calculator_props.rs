//! Property-based tests for the retention calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{RetentionCalculator, RetentionInput};

/// Strategy to generate subtotals (0.00 to 100,000,000.00).
fn subtotal() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate arbitrary percentages, including out-of-range ones.
fn any_percent() -> impl Strategy<Value = Decimal> {
    (-50_000i64..50_000i64).prop_map(|v| Decimal::new(v, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Withholding amounts stay within [0, subtotal] regardless of the
    /// requested percentage.
    #[test]
    fn prop_amounts_bounded_by_subtotal(
        subtotal in subtotal(),
        source_percent in any_percent(),
        ica_percent in any_percent(),
    ) {
        let breakdown = RetentionCalculator::compute(&RetentionInput {
            subtotal,
            source_enabled: true,
            source_percent,
            ica_enabled: true,
            ica_percent,
        });

        prop_assert!(breakdown.source_amount >= Decimal::ZERO);
        prop_assert!(breakdown.source_amount <= subtotal);
        prop_assert!(breakdown.ica_amount >= Decimal::ZERO);
        prop_assert!(breakdown.ica_amount <= subtotal);
    }

    /// Disabled flags force zero amounts no matter the percentage.
    #[test]
    fn prop_disabled_is_zero(
        subtotal in subtotal(),
        source_percent in any_percent(),
        ica_percent in any_percent(),
    ) {
        let breakdown = RetentionCalculator::compute(&RetentionInput {
            subtotal,
            source_enabled: false,
            source_percent,
            ica_enabled: false,
            ica_percent,
        });

        prop_assert_eq!(breakdown.source_amount, Decimal::ZERO);
        prop_assert_eq!(breakdown.ica_amount, Decimal::ZERO);
    }

    /// Recomputation is idempotent: the same inputs always produce the
    /// same breakdown, with no hidden accumulation between calls.
    #[test]
    fn prop_recompute_idempotent(
        subtotal in subtotal(),
        source_percent in any_percent(),
        ica_percent in any_percent(),
        source_enabled in any::<bool>(),
        ica_enabled in any::<bool>(),
    ) {
        let input = RetentionInput {
            subtotal,
            source_enabled,
            source_percent,
            ica_enabled,
            ica_percent,
        };

        let first = RetentionCalculator::compute(&input);
        let second = RetentionCalculator::compute(&input);
        prop_assert_eq!(first, second);
    }

    /// The IVA base is the rounded subtotal, untouched by withholdings.
    #[test]
    fn prop_iva_base_is_subtotal(
        subtotal in subtotal(),
        source_percent in any_percent(),
    ) {
        let breakdown = RetentionCalculator::compute(&RetentionInput {
            subtotal,
            source_enabled: true,
            source_percent,
            ica_enabled: false,
            ica_percent: Decimal::ZERO,
        });

        prop_assert_eq!(breakdown.iva_base, subtotal);
    }
}
