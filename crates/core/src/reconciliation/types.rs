//! Claim guard domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::credit::types::{OrderKind, OrderStatus};

/// What a delivery line item claims: one cash sale order or one
/// installment payment, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ClaimTarget {
    /// A contado sale order.
    CashOrder(Uuid),
    /// An installment payment on a credit sale.
    Installment(Uuid),
}

impl ClaimTarget {
    /// Returns the claimed entity's id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::CashOrder(id) | Self::Installment(id) => *id,
        }
    }
}

impl fmt::Display for ClaimTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CashOrder(id) => write!(f, "order {id}"),
            Self::Installment(id) => write!(f, "payment {id}"),
        }
    }
}

/// A live claim held by a delivery batch.
///
/// Only line items of live (draft or confirmed) batches are handed to
/// the guard; deleted drafts release their claims with them.
#[derive(Debug, Clone, Copy)]
pub struct ExistingClaim {
    /// The claimed order or payment.
    pub target: ClaimTarget,
    /// The batch holding the claim.
    pub batch_id: Uuid,
}

/// A sale order considered for inclusion in a batch.
#[derive(Debug, Clone)]
pub struct CandidateOrder {
    /// The order ID.
    pub id: Uuid,
    /// The site the order belongs to.
    pub site_id: Uuid,
    /// Cash or credit kind.
    pub kind: OrderKind,
    /// Order lifecycle state.
    pub status: OrderStatus,
    /// Order total net of sales returns.
    pub net_total: Decimal,
}

/// An installment payment considered for inclusion in a batch.
#[derive(Debug, Clone)]
pub struct CandidatePayment {
    /// The payment ID.
    pub id: Uuid,
    /// The site of the payment's parent order.
    pub site_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_target_id() {
        let id = Uuid::new_v4();
        assert_eq!(ClaimTarget::CashOrder(id).id(), id);
        assert_eq!(ClaimTarget::Installment(id).id(), id);
    }

    #[test]
    fn test_claim_target_display() {
        let id = Uuid::nil();
        assert_eq!(
            ClaimTarget::CashOrder(id).to_string(),
            format!("order {id}")
        );
        assert_eq!(
            ClaimTarget::Installment(id).to_string(),
            format!("payment {id}")
        );
    }

    #[test]
    fn test_claim_targets_with_same_id_differ() {
        let id = Uuid::new_v4();
        assert_ne!(ClaimTarget::CashOrder(id), ClaimTarget::Installment(id));
    }
}
