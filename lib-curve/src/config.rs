//! Engine and Launch Configuration
//!
//! All values are passed explicitly into the engine; nothing here is read from
//! global state. Defaults reproduce the reference launch parameters
//! (30 SOL / 1.073B virtual reserves, 793.1M tokens sold through the curve,
//! 1% fee, 85 SOL migration threshold).
//!
//! # File format
//!
//! ```toml
//! [engine]
//! migration_threshold_sol = 85000000000
//! max_trade_fraction_bps = 5000
//! min_trade_amount = 1000000
//! pool_liquidity_bps = 8000
//!
//! [engine.fees]
//! fee_basis_points = 100
//! creator_fee_basis_points = 0
//!
//! [launch]
//! initial_virtual_token_reserves = 1073000000000000
//! initial_virtual_sol_reserves = 30000000000
//! initial_real_token_reserves = 793100000000000
//! token_total_supply = 1000000000000000
//! ```
//!
//! Missing keys fall back to the defaults.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use lib_types::{Amount, Bps, FeeSchedule, BPS_DENOMINATOR};

use crate::errors::{CurveError, CurveResult};

/// 85 SOL in lamports
pub const DEFAULT_MIGRATION_THRESHOLD_SOL: Amount = 85_000_000_000;

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Trading parameters applied by `TradeEngine` to every curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trade fee and creator share
    pub fees: FeeSchedule,
    /// Real SOL a curve must hold before it may migrate (lamports)
    pub migration_threshold_sol: Amount,
    /// Largest buy as a share of current virtual token reserves
    pub max_trade_fraction_bps: Bps,
    /// Smallest trade in token base units
    pub min_trade_amount: Amount,
    /// Share of real reserves seeded into the external pool at migration
    pub pool_liquidity_bps: Bps,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            migration_threshold_sol: DEFAULT_MIGRATION_THRESHOLD_SOL,
            max_trade_fraction_bps: 5_000,
            min_trade_amount: 1_000_000,
            pool_liquidity_bps: 8_000,
        }
    }
}

impl EngineConfig {
    /// Permissive parameters for testing (no fee, any trade size)
    pub fn for_testing() -> Self {
        Self {
            fees: FeeSchedule {
                fee_basis_points: 0,
                creator_fee_basis_points: 0,
            },
            migration_threshold_sol: DEFAULT_MIGRATION_THRESHOLD_SOL,
            max_trade_fraction_bps: 10_000,
            min_trade_amount: 1,
            pool_liquidity_bps: 8_000,
        }
    }

    /// Reject malformed parameters
    pub fn validate(&self) -> CurveResult<()> {
        lib_fees::validate_schedule(&self.fees)?;

        if self.migration_threshold_sol == 0 {
            return Err(CurveError::InvalidConfiguration(
                "migration_threshold_sol must be greater than zero".to_string(),
            ));
        }
        if self.max_trade_fraction_bps == 0
            || u64::from(self.max_trade_fraction_bps) > BPS_DENOMINATOR
        {
            return Err(CurveError::InvalidConfiguration(format!(
                "max_trade_fraction_bps {} out of range (0, 10000]",
                self.max_trade_fraction_bps
            )));
        }
        if self.pool_liquidity_bps == 0 || u64::from(self.pool_liquidity_bps) > BPS_DENOMINATOR {
            return Err(CurveError::InvalidConfiguration(format!(
                "pool_liquidity_bps {} out of range (0, 10000]",
                self.pool_liquidity_bps
            )));
        }
        Ok(())
    }
}

// =============================================================================
// LAUNCH PARAMETERS
// =============================================================================

/// Reserves a curve starts with at token launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchParams {
    pub initial_virtual_token_reserves: Amount,
    pub initial_virtual_sol_reserves: Amount,
    /// Tokens deposited in the curve vault for sale
    pub initial_real_token_reserves: Amount,
    pub token_total_supply: Amount,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            initial_virtual_token_reserves: 1_073_000_000_000_000,
            initial_virtual_sol_reserves: 30_000_000_000,
            initial_real_token_reserves: 793_100_000_000_000,
            token_total_supply: 1_000_000_000_000_000,
        }
    }
}

impl LaunchParams {
    /// Allocation held outside the curve for its whole life
    pub fn reserved_tokens(&self) -> Amount {
        self.token_total_supply
            .saturating_sub(self.initial_real_token_reserves)
    }

    pub fn validate(&self) -> CurveResult<()> {
        if self.initial_virtual_token_reserves == 0 || self.initial_virtual_sol_reserves == 0 {
            return Err(CurveError::InvalidConfiguration(
                "initial virtual reserves must be greater than zero".to_string(),
            ));
        }
        if self.initial_real_token_reserves > self.token_total_supply {
            return Err(CurveError::InvalidConfiguration(format!(
                "initial_real_token_reserves {} exceeds token_total_supply {}",
                self.initial_real_token_reserves, self.token_total_supply
            )));
        }
        // Virtual reserves must outlast real ones or the last buy divides by zero
        if self.initial_real_token_reserves >= self.initial_virtual_token_reserves {
            return Err(CurveError::InvalidConfiguration(format!(
                "initial_real_token_reserves {} must be below initial_virtual_token_reserves {}",
                self.initial_real_token_reserves, self.initial_virtual_token_reserves
            )));
        }
        Ok(())
    }
}

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Complete configuration file: engine parameters plus launch reserves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub engine: EngineConfig,
    pub launch: LaunchParams,
}

impl CurveConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: CurveConfig =
            toml::from_str(content).context("Failed to parse curve configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read curve configuration {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid curve configuration {}", path.display()))?;
        tracing::info!(
            "Loaded curve configuration from {}: fee {} bps, threshold {} lamports",
            path.display(),
            config.engine.fees.fee_basis_points,
            config.engine.migration_threshold_sol
        );
        Ok(config)
    }

    pub fn validate(&self) -> CurveResult<()> {
        self.engine.validate()?;
        self.launch.validate()
    }
}
