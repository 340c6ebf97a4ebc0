//! Core business logic for Tesoro.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `retention` - Tax withholding (retencion) calculations
//! - `credit` - Credit lifecycle and balance arithmetic
//! - `payment` - Installment (abono) registration rules
//! - `reconciliation` - At-most-once claim guard for delivery batches
//! - `delivery` - Cash-delivery batch assembly and confirmation
//! - `closeout` - Special-client bulk credit closeout

pub mod closeout;
pub mod credit;
pub mod delivery;
pub mod payment;
pub mod reconciliation;
pub mod retention;
