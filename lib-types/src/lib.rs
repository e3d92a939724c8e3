//! Bonding-curve primitives.
//! Stable, venue-neutral, behavior-free.
//!
//! Rule: amounts are integers in the smallest unit (lamports for SOL,
//! base units for tokens). No floats in persisted state. Ever.

pub mod primitives;
pub mod fees;

pub use primitives::{Address, Amount, Bps, TokenId, BPS_DENOMINATOR};
pub use fees::FeeSchedule;
