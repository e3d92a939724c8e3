//! Bonding-Curve Pricing and Trading Engine
//!
//! Constant-product curve over virtual reserves, with fee accounting, slippage
//! limits and migration-readiness evaluation.
//!
//! # Curve Lifecycle
//! ```text
//!   launch ──▶ ┌────────┐   threshold met,    ┌──────────┐
//!              │ Active │ ──────────────────▶ │ Complete │
//!              └────────┘   pool seeded       └──────────┘
//!               │    ▲      (external)
//!               └────┘
//!            buy / sell
//! ```
//!
//! # Layers
//!
//! - `math` - pure curve arithmetic (u128 intermediates, directional rounding)
//! - `state` - the `CurveState` record and its invariants
//! - `engine` - `TradeEngine`: validation, fees, slippage, receipts
//! - `migration` - threshold evaluation, pool seed plan, completion
//! - `registry` - `CurveRegistry` boundary with optimistic versioning
//! - `desk` - per-token serialized load/trade/save loop for callers
//!
//! The engine performs no I/O and reads no global state. Storage, signing
//! and broadcasting belong to the caller.
//!
//! # Usage
//!
//! ```
//! use lib_curve::{CurveState, EngineConfig, LaunchParams, TradeEngine};
//! use lib_types::{Address, TokenId};
//!
//! let engine = TradeEngine::new(EngineConfig::default()).unwrap();
//! let curve = CurveState::launch(
//!     TokenId::new([1; 32]),
//!     Address::new([2; 32]),
//!     &LaunchParams::default(),
//! )
//! .unwrap();
//!
//! // 1000 tokens (6 decimals), paying at most 28_239 lamports
//! let (next, receipt) = engine.execute_buy(&curve, 1_000_000_000, 28_239).unwrap();
//! assert_eq!(receipt.gross_sol, 27_960);
//! assert_eq!(receipt.fee.total, 279);
//! assert_eq!(next.real_sol_reserves, 27_960);
//! ```

pub mod config;
pub mod desk;
pub mod engine;
pub mod errors;
pub mod math;
pub mod migration;
pub mod receipt;
pub mod registry;
pub mod state;

#[cfg(test)]
mod golden_vectors;

pub use config::{CurveConfig, EngineConfig, LaunchParams, DEFAULT_MIGRATION_THRESHOLD_SOL};
pub use desk::{DeskError, DeskResult, TradeDesk};
pub use engine::TradeEngine;
pub use errors::{CurveError, CurveResult};
pub use math::{BuyQuote, Price, SellQuote, PRICE_SCALE};
pub use migration::{
    complete_migration, evaluate, plan_liquidity_seed, LiquiditySeed, MigrationStatus,
};
pub use receipt::{Asset, Party, TradeReceipt, TradeSide, TransferIntent};
pub use registry::{
    CurveRegistry, InMemoryCurveRegistry, RegistryError, RegistryResult, RegistryStats,
};
pub use state::{CurveState, CurveStats, Phase};
