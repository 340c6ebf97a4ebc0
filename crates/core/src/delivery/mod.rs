//! Cash-delivery batch (entrega de dinero) assembly and confirmation.
//!
//! A delivery batch is one cashier-to-treasury hand-off for a site over
//! a date window. While in draft it aggregates claimed cash orders and
//! installment payments minus attached site expenses; confirmation
//! records the declared-vs-expected variance and locks the batch
//! permanently.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::DeliveryError;
pub use service::DeliveryService;
pub use types::{
    Confirmation, DeclaredAmounts, DeliveryStatus, ExpectedBreakdown, LineAmount,
};
