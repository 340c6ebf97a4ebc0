//! Monetary helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts in the system are `rust_decimal::Decimal` values with a
//! scale of two (smallest currency unit).

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary epsilon in hundredths: a balance within one cent of zero
/// counts as settled.
pub const BALANCE_EPSILON_CENTS: i64 = 1;

/// Returns the monetary epsilon (0.01 currency units).
#[must_use]
pub fn balance_epsilon() -> Decimal {
    Decimal::new(BALANCE_EPSILON_CENTS, 2)
}

/// Rounds an amount to two decimal places using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if a pending balance counts as fully paid.
///
/// A balance at or below the monetary epsilon is settled; tiny residues
/// from rounding must not keep a credit open forever.
#[must_use]
pub fn is_settled(pending_balance: Decimal) -> bool {
    pending_balance <= balance_epsilon()
}
