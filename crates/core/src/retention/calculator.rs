//! Withholding amount calculation for an order or invoice.
//!
//! The calculation is a total function: every input produces a breakdown,
//! with out-of-range percentages clamped rather than rejected. Calling it
//! twice with the same inputs yields the same outputs - there is no hidden
//! accumulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tesoro_shared::types::round_money;

/// Input for a withholding calculation.
///
/// Percentages are plain percentages in [0,100]; values outside that range
/// are clamped. Per-mil ICA tariffs must be converted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionInput {
    /// Order subtotal before tax.
    pub subtotal: Decimal,
    /// Whether source retention applies.
    pub source_enabled: bool,
    /// Source retention percentage.
    pub source_percent: Decimal,
    /// Whether ICA retention applies.
    pub ica_enabled: bool,
    /// ICA retention percentage.
    pub ica_percent: Decimal,
}

/// Computed withholding amounts for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionBreakdown {
    /// Source retention amount (zero when disabled).
    pub source_amount: Decimal,
    /// ICA retention amount (zero when disabled).
    pub ica_amount: Decimal,
    /// The base on which IVA applies, recomputed from the subtotal.
    ///
    /// Withholdings are settled against the receivable, not the tax base,
    /// so this equals the rounded subtotal.
    pub iva_base: Decimal,
}

/// Pure calculator for order withholdings.
pub struct RetentionCalculator;

impl RetentionCalculator {
    /// Computes both withholding amounts and the IVA base for an order.
    ///
    /// Guarantees:
    /// - a disabled flag forces its amount to zero
    /// - percentages are clamped to [0,100]
    /// - no withholding amount ever exceeds the subtotal
    #[must_use]
    pub fn compute(input: &RetentionInput) -> RetentionBreakdown {
        let subtotal = round_money(input.subtotal.max(Decimal::ZERO));

        let source_amount = if input.source_enabled {
            Self::portion(subtotal, input.source_percent)
        } else {
            Decimal::ZERO
        };

        let ica_amount = if input.ica_enabled {
            Self::portion(subtotal, input.ica_percent)
        } else {
            Decimal::ZERO
        };

        RetentionBreakdown {
            source_amount,
            ica_amount,
            iva_base: subtotal,
        }
    }

    /// Applies a clamped percentage to a subtotal, capped at the subtotal.
    fn portion(subtotal: Decimal, percent: Decimal) -> Decimal {
        let clamped = Self::clamp_percent(percent);
        let raw = round_money(subtotal * clamped / Decimal::ONE_HUNDRED);
        raw.min(subtotal)
    }

    /// Clamps a withholding percentage to [0,100].
    #[must_use]
    pub fn clamp_percent(percent: Decimal) -> Decimal {
        percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }
}
