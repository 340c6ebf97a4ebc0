//! Tax withholding (retencion) calculations.
//!
//! Colombian sales carry two optional withholdings: source retention
//! (retencion en la fuente) and ICA retention. Both are subtracted from
//! what the buyer owes the seller, so they feed directly into credit
//! balance arithmetic.

pub mod calculator;

#[cfg(test)]
mod calculator_props;

pub use calculator::{RetentionBreakdown, RetentionCalculator, RetentionInput};
