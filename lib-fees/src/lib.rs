//! Curve Trade Fee Model
//!
//! Pure, deterministic fee computation for bonding-curve trades.
//!
//! # Design Principles
//!
//! 1. **Pure functions** - No side effects, no global state
//! 2. **Deterministic** - Same inputs produce identical outputs across all platforms
//! 3. **No floats** - All arithmetic uses u64/u128 integers
//! 4. **Round down** - Fees are floored; the curve amount is never touched
//!
//! # Type Architecture
//!
//! The pure data type `FeeSchedule` is defined in `lib-types::fees` and
//! re-exported here for convenience.
//!
//! # Usage
//!
//! ```
//! use lib_fees::{apply_buy_fee, apply_sell_fee};
//!
//! // 1% fee is added on top of the curve cost for buys...
//! let buy = apply_buy_fee(27_960, 100).unwrap();
//! assert_eq!(buy.fee, 279);
//! assert_eq!(buy.total_cost, 28_239);
//!
//! // ...and taken out of the curve proceeds for sells.
//! let sell = apply_sell_fee(27_960, 100).unwrap();
//! assert_eq!(sell.net_output, 27_681);
//! ```

pub mod errors;
pub mod model;

#[cfg(test)]
mod golden_vectors;

// Re-export pure data types from lib-types (canonical location)
pub use lib_types::fees::FeeSchedule;

pub use errors::{FeeError, FeeResult};
pub use model::{
    apply_buy_fee, apply_sell_fee, compute_fee, split_fee, validate_fee_bps, validate_schedule,
    BuyFee, FeeBreakdown, SellFee,
};
