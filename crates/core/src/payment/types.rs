//! Payment domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::credit::types::PaymentMethod;

/// Input for registering one installment against a credit.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Payment amount (must be positive).
    pub amount: Decimal,
    /// Date the payment was received.
    pub paid_on: NaiveDate,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Optional receipt or invoice reference.
    pub receipt_ref: Option<String>,
}

/// Snapshot of a persisted payment handed to amendment validation.
#[derive(Debug, Clone)]
pub struct PaymentSnapshot {
    /// The payment ID.
    pub id: Uuid,
    /// Current recorded amount.
    pub amount: Decimal,
    /// Whether a confirmed delivery batch has claimed this payment.
    pub claimed_by_confirmed_batch: bool,
}
