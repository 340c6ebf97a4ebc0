//! Credit domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Sale order kind: paid on the spot or financed as a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Contado sale, settled at the counter.
    Cash,
    /// Credito sale, settled through installments.
    Credit,
}

impl OrderKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Credit => "credit",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sale order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order is being assembled and has no ledger effect yet.
    Draft,
    /// Order is finalized and participates in the ledger.
    Finalized,
    /// Order was annulled; it never participates in deliveries.
    Voided,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "finalized" => Some(Self::Finalized),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit lifecycle state.
///
/// Credits are never deleted; `Voided` is the soft terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    /// Balance outstanding, payments accepted.
    Open,
    /// Balance settled within the monetary epsilon.
    Closed,
    /// Past the overdue grace period; payments still accepted.
    Overdue,
    /// Administratively annulled; balance frozen.
    Voided,
}

impl CreditStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Overdue => "overdue",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "overdue" => Some(Self::Overdue),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }

    /// Returns true if the credit still accepts payments.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        matches!(self, Self::Open | Self::Overdue)
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method for an installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the counter.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card payment.
    Card,
    /// Check.
    Check,
    /// Anything else, described in the receipt reference.
    Other,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
            Self::Check => "check",
            Self::Other => "other",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            "check" => Some(Self::Check),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the sale order a credit is opened against.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    /// The order ID.
    pub id: Uuid,
    /// Cash or credit kind.
    pub kind: OrderKind,
    /// Order lifecycle state.
    pub status: OrderStatus,
    /// Order total.
    pub total: Decimal,
    /// Source withholding already recorded on the order.
    pub source_withholding: Decimal,
    /// ICA withholding already recorded on the order.
    pub ica_withholding: Decimal,
    /// Whether a credit already exists for this order.
    pub has_credit: bool,
}

/// Snapshot of a persisted credit handed to the service for recomputation.
#[derive(Debug, Clone)]
pub struct CreditSnapshot {
    /// The credit ID.
    pub id: Uuid,
    /// Current lifecycle state.
    pub status: CreditStatus,
    /// Total credit amount from the originating order.
    pub credit_total: Decimal,
    /// Source withholding from the originating order.
    pub source_withholding: Decimal,
    /// ICA withholding from the originating order.
    pub ica_withholding: Decimal,
}

/// Result of opening a credit.
#[derive(Debug, Clone)]
pub struct NewCredit {
    /// The originating order.
    pub order_id: Uuid,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Initial pending balance (total minus known withholdings).
    pub pending_balance: Decimal,
    /// Initial lifecycle state.
    pub status: CreditStatus,
    /// Opening date.
    pub opened_on: NaiveDate,
}

/// Recomputed balance state after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceState {
    /// Authoritative sum of payment amounts.
    pub paid_total: Decimal,
    /// Recomputed pending balance.
    pub pending_balance: Decimal,
    /// Lifecycle state implied by the new balance.
    pub status: CreditStatus,
}

/// Outcome of settling one payment against a credit.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// Authoritative paid total including the new payment.
    pub paid_total: Decimal,
    /// Pending balance after the payment.
    pub pending_balance: Decimal,
    /// Lifecycle state after the payment.
    pub status: CreditStatus,
    /// True when this payment settled the credit.
    pub closes_credit: bool,
}

/// Requested withholding change for a credit's originating order.
#[derive(Debug, Clone)]
pub struct WithholdingUpdate {
    /// Whether source retention applies.
    pub source_enabled: bool,
    /// Source retention amount.
    pub source_amount: Decimal,
    /// Whether ICA retention applies.
    pub ica_enabled: bool,
    /// ICA retention amount.
    pub ica_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_status_roundtrip() {
        for status in [
            CreditStatus::Open,
            CreditStatus::Closed,
            CreditStatus::Overdue,
            CreditStatus::Voided,
        ] {
            assert_eq!(CreditStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CreditStatus::parse("settled"), None);
    }

    #[test]
    fn test_credit_status_accepts_payments() {
        assert!(CreditStatus::Open.accepts_payments());
        assert!(CreditStatus::Overdue.accepts_payments());
        assert!(!CreditStatus::Closed.accepts_payments());
        assert!(!CreditStatus::Voided.accepts_payments());
    }

    #[test]
    fn test_order_kind_roundtrip() {
        assert_eq!(OrderKind::parse("CASH"), Some(OrderKind::Cash));
        assert_eq!(OrderKind::parse("credit"), Some(OrderKind::Credit));
        assert_eq!(OrderKind::parse("barter"), None);
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Transfer,
            PaymentMethod::Card,
            PaymentMethod::Check,
            PaymentMethod::Other,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("crypto"), None);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(format!("{}", CreditStatus::Overdue), "overdue");
        assert_eq!(format!("{}", OrderStatus::Finalized), "finalized");
        assert_eq!(format!("{}", PaymentMethod::Transfer), "transfer");
    }
}
