//! Migration Evaluator
//!
//! Read-only assessment of a curve against its migration threshold, plus the
//! two hooks the external migration process uses: planning the pool seed and
//! marking the curve complete.
//!
//! # Migration Flow
//! ```text
//!   evaluate ──▶ can_migrate ──▶ plan_liquidity_seed ──▶ (external pool seeded)
//!                                                              │
//!                                   complete_migration ◀──────┘
//! ```
//!
//! Only `real_sol_reserves` counts toward the threshold. Virtual reserves are
//! pricing state and never stand in for collected SOL.

use serde::{Deserialize, Serialize};

use lib_types::{Amount, Bps, BPS_DENOMINATOR};

use crate::errors::{CurveError, CurveResult};
use crate::math::{self, Price};
use crate::state::CurveState;

/// Readiness of one curve for migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Threshold met and curve still active
    pub can_migrate: bool,
    /// `min(current / threshold, 1)` in basis points, rounded down
    pub progress_bps: u16,
    /// SOL still missing, zero once the threshold is met
    pub required_sol: Amount,
    pub current_sol: Amount,
    pub threshold_sol: Amount,
}

impl MigrationStatus {
    /// Progress as a fraction in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress_bps as f64 / BPS_DENOMINATOR as f64
    }
}

/// Amounts handed to the external pool when a curve migrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquiditySeed {
    pub token_amount: Amount,
    pub sol_amount: Amount,
    /// Unsold and reserved tokens left over after seeding
    pub residual_tokens: Amount,
    pub residual_sol: Amount,
    /// `sol_amount / token_amount`
    pub opening_price: Price,
}

/// Assess `state` against `threshold_sol`
///
/// # Errors
///
/// `InvalidConfiguration` if `threshold_sol` is zero.
pub fn evaluate(state: &CurveState, threshold_sol: Amount) -> CurveResult<MigrationStatus> {
    if threshold_sol == 0 {
        return Err(CurveError::InvalidConfiguration(
            "migration threshold must be greater than zero".to_string(),
        ));
    }

    let current_sol = state.real_sol_reserves;
    let threshold_met = current_sol >= threshold_sol;
    let progress_bps = if threshold_met {
        BPS_DENOMINATOR
    } else {
        // current_sol < threshold_sol, so this is below 10000
        ((current_sol as u128) * (BPS_DENOMINATOR as u128) / (threshold_sol as u128)) as u64
    };

    Ok(MigrationStatus {
        can_migrate: threshold_met && !state.complete,
        progress_bps: progress_bps as u16,
        required_sol: threshold_sol.saturating_sub(current_sol),
        current_sol,
        threshold_sol,
    })
}

/// Mark `state` as migrated
///
/// The only transition into `Phase::Complete`. Called by the external
/// migration process after the pool is seeded.
///
/// # Errors
///
/// - `CurveComplete` if the curve already migrated
/// - `ThresholdNotMet` if real SOL is still below `threshold_sol`
pub fn complete_migration(state: &CurveState, threshold_sol: Amount) -> CurveResult<CurveState> {
    state.ensure_active()?;

    let status = evaluate(state, threshold_sol)?;
    if !status.can_migrate {
        return Err(CurveError::ThresholdNotMet {
            current: status.current_sol,
            required: threshold_sol,
        });
    }

    let completed = state.completed()?;
    tracing::info!(
        "Curve {} complete: {} lamports collected, {} tokens unsold",
        state.token_id.short(),
        completed.real_sol_reserves,
        completed.real_token_reserves
    );
    Ok(completed)
}

/// Plan the external pool seed
///
/// The token side draws on the unsold curve tokens plus the reserved
/// allocation; the SOL side on the real SOL reserves. `pool_liquidity_bps`
/// of each goes to the pool, rounded down, and the rest is returned as
/// residuals. Works on a curve that is ready to migrate or already complete.
///
/// # Errors
///
/// - `InvalidConfiguration` for a zero threshold or `pool_liquidity_bps`
///   outside `(0, 10000]`
/// - `ThresholdNotMet` if real SOL is below `threshold_sol`
/// - `InsufficientLiquidity` if no tokens would reach the pool
pub fn plan_liquidity_seed(
    state: &CurveState,
    threshold_sol: Amount,
    pool_liquidity_bps: Bps,
) -> CurveResult<LiquiditySeed> {
    if pool_liquidity_bps == 0 || u64::from(pool_liquidity_bps) > BPS_DENOMINATOR {
        return Err(CurveError::InvalidConfiguration(format!(
            "pool_liquidity_bps {} out of range (0, 10000]",
            pool_liquidity_bps
        )));
    }

    let status = evaluate(state, threshold_sol)?;
    if status.current_sol < threshold_sol {
        return Err(CurveError::ThresholdNotMet {
            current: status.current_sol,
            required: threshold_sol,
        });
    }

    let pool_tokens = state
        .real_token_reserves
        .checked_add(state.reserved_tokens)
        .ok_or(CurveError::Overflow)?;
    let token_amount = share_of(pool_tokens, pool_liquidity_bps);
    let sol_amount = share_of(state.real_sol_reserves, pool_liquidity_bps);
    if token_amount == 0 {
        return Err(CurveError::InsufficientLiquidity(format!(
            "curve {} has no tokens left to seed a pool",
            state.token_id
        )));
    }

    Ok(LiquiditySeed {
        token_amount,
        sol_amount,
        residual_tokens: pool_tokens - token_amount,
        residual_sol: state.real_sol_reserves - sol_amount,
        opening_price: math::price_at(sol_amount, token_amount)?,
    })
}

fn share_of(amount: Amount, bps: Bps) -> Amount {
    // bps <= 10000, so the result never exceeds amount
    ((amount as u128) * (bps as u128) / (BPS_DENOMINATOR as u128)) as Amount
}
