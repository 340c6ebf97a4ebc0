//! At-most-once claim guard for delivery batches.
//!
//! A sale order or installment payment may be claimed by at most one
//! live delivery batch. "Claimed" is derived from existing line items,
//! never from a stored flag, so the guard cannot drift from the batches
//! themselves.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReconciliationError;
pub use service::ReconciliationService;
pub use types::{CandidateOrder, CandidatePayment, ClaimTarget, ExistingClaim};
