//! Delivery batch domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reconciliation::types::ClaimTarget;

/// Delivery batch lifecycle state.
///
/// The machine is deliberately small: a draft either becomes confirmed
/// (terminal) or is deleted outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Batch is being assembled; items and expenses may change.
    Draft,
    /// Batch is confirmed; claims and amounts are locked forever.
    Confirmed,
}

impl DeliveryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }

    /// Returns true while the batch can still be mutated.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amounts the cashier declares at confirmation, broken out by method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclaredAmounts {
    /// Declared cash amount.
    pub cash: Decimal,
    /// Declared bank-transfer amount.
    pub transfer: Decimal,
    /// Declared check amount.
    pub check: Decimal,
    /// Declared direct-deposit amount.
    pub deposit: Decimal,
}

impl DeclaredAmounts {
    /// Sums the declared amounts across methods.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cash + self.transfer + self.check + self.deposit
    }
}

/// One claimed amount feeding the expected total.
#[derive(Debug, Clone)]
pub struct LineAmount {
    /// The claimed order or payment.
    pub target: ClaimTarget,
    /// Claimed amount snapshot (net of returns for cash orders).
    pub amount: Decimal,
}

/// Expected amount derivation for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedBreakdown {
    /// Sum of claimed cash-order net totals.
    pub order_total: Decimal,
    /// Sum of claimed installment amounts.
    pub payment_total: Decimal,
    /// Sum of attached site expenses.
    pub expense_total: Decimal,
    /// `order_total + payment_total - expense_total`.
    pub expected: Decimal,
}

/// Result of confirming a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Sum of the declared amounts.
    pub declared_total: Decimal,
    /// `declared_total - expected`, reported as-is, never corrected.
    pub variance: Decimal,
}
