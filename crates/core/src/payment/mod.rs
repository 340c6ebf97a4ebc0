//! Installment (abono) registration rules.
//!
//! Validates payment input before any mutation and delegates balance
//! arithmetic to the credit service. A registered payment becomes
//! eligible for claim by a delivery batch of the same site until a
//! confirmed batch locks it.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{PaymentInput, PaymentSnapshot};
