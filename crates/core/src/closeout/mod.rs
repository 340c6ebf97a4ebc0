//! Special-client bulk credit closeout.
//!
//! A closeout groups a chosen set of one designated client's open
//! credits into a single audit record with per-credit snapshots. It is
//! an administrative consolidation layered on top of the ledger: the
//! included credits keep their state and close only through payments.

pub mod error;
pub mod service;
pub mod types;

pub use error::CloseoutError;
pub use service::CloseoutService;
pub use types::{CloseoutCandidate, CloseoutRecord, CloseoutSnapshot};
