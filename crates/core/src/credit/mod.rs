//! Credit lifecycle and balance arithmetic.
//!
//! A credit is the payable balance created by a credit-kind sale order.
//! This module owns the balance invariant:
//!
//! `pending_balance = credit_total - paid_total - source_withholding - ica_withholding`
//!
//! Every recomputation starts from the authoritative sum of payment
//! records, never from incremental counters, so a rebuild from payments
//! always reproduces the stored balance exactly.

pub mod error;
pub mod overdue;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CreditError;
pub use overdue::OverduePolicy;
pub use service::CreditService;
pub use types::{
    BalanceState, CreditSnapshot, CreditStatus, NewCredit, OrderKind, OrderSnapshot, OrderStatus,
    PaymentMethod, PaymentOutcome, WithholdingUpdate,
};
