//! Closeout domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credit::types::CreditStatus;

/// A credit considered for inclusion in a closeout.
#[derive(Debug, Clone)]
pub struct CloseoutCandidate {
    /// The credit ID.
    pub credit_id: Uuid,
    /// The client owning the credit.
    pub client_id: Uuid,
    /// Credit lifecycle state.
    pub status: CreditStatus,
    /// Human-facing number of the originating order.
    pub order_number: i64,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Pending balance at the moment of the closeout.
    pub pending_balance: Decimal,
}

/// Per-credit snapshot captured by a closeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseoutSnapshot {
    /// The included credit.
    pub credit_id: Uuid,
    /// Order number at the time of the closeout.
    pub order_number: i64,
    /// Credit total at the time of the closeout.
    pub credit_total: Decimal,
    /// Pending balance before the closeout was recorded.
    pub prior_balance: Decimal,
}

/// A validated closeout ready to persist.
#[derive(Debug, Clone)]
pub struct CloseoutRecord {
    /// The designated client.
    pub client_id: Uuid,
    /// The worker performing the closeout.
    pub performed_by: Uuid,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Per-credit snapshots, in request order.
    pub items: Vec<CloseoutSnapshot>,
}

impl CloseoutRecord {
    /// Sums the prior balances captured by this closeout.
    #[must_use]
    pub fn total_prior_balance(&self) -> Decimal {
        self.items.iter().map(|item| item.prior_balance).sum()
    }
}
