//! Trade Fee Model (Pure Function)
//!
//! Deterministic fee computation for curve trades.
//!
//! # Rules (enforced in code)
//!
//! - `fee = floor(base * fee_bps / 10000)`
//! - Buy: fee is additive, `total_cost = sol_required + fee`
//! - Sell: fee is subtractive, `net_output = gross_output - fee`
//! - Creator share is carved out of the fee, never added on top
//! - `fee_bps` must be in `[0, 10000)`
//! - u128 arithmetic internally to prevent overflow

use serde::{Deserialize, Serialize};

use lib_types::{Amount, Bps, FeeSchedule, BPS_DENOMINATOR};

use crate::errors::{FeeError, FeeResult};

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Fee applied to a buy: charged on top of the curve cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyFee {
    /// Fee amount in lamports
    pub fee: Amount,
    /// Curve cost plus fee; what the buyer pays
    pub total_cost: Amount,
}

/// Fee applied to a sell: deducted from the curve proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellFee {
    /// Fee amount in lamports
    pub fee: Amount,
    /// Curve proceeds minus fee; what the seller receives
    pub net_output: Amount,
}

/// Routing of one trade fee between protocol and creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Whole fee charged to the trader
    pub total: Amount,
    /// Share routed to the protocol fee vault
    pub protocol: Amount,
    /// Share routed to the curve creator
    pub creator: Amount,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check a basis-point rate is usable as a trade fee
pub fn validate_fee_bps(bps: Bps) -> FeeResult<()> {
    if u64::from(bps) >= BPS_DENOMINATOR {
        return Err(FeeError::BasisPointsOutOfRange { bps });
    }
    Ok(())
}

/// Check a full fee schedule
///
/// The creator share comes out of the trade fee, so it can never be larger.
pub fn validate_schedule(schedule: &FeeSchedule) -> FeeResult<()> {
    validate_fee_bps(schedule.fee_basis_points)?;
    validate_fee_bps(schedule.creator_fee_basis_points)?;
    if schedule.creator_fee_basis_points > schedule.fee_basis_points {
        return Err(FeeError::CreatorShareExceedsFee {
            creator_bps: schedule.creator_fee_basis_points,
            fee_bps: schedule.fee_basis_points,
        });
    }
    Ok(())
}

// =============================================================================
// FEE COMPUTATION (PURE FUNCTIONS)
// =============================================================================

/// Compute `floor(base * bps / 10000)`
///
/// The product is formed in u128 so no base amount can wrap; the quotient is
/// always `<= base` because `bps < 10000`.
pub fn compute_fee(base: Amount, bps: Bps) -> FeeResult<Amount> {
    validate_fee_bps(bps)?;
    let fee = (base as u128) * (bps as u128) / (BPS_DENOMINATOR as u128);
    Amount::try_from(fee).map_err(|_| FeeError::Overflow)
}

/// Apply the buy-side fee to a curve cost
///
/// # Algorithm
///
/// ```text
/// fee        = floor(sol_required * fee_bps / 10000)
/// total_cost = sol_required + fee
/// ```
pub fn apply_buy_fee(sol_required: Amount, fee_bps: Bps) -> FeeResult<BuyFee> {
    let fee = compute_fee(sol_required, fee_bps)?;
    let total_cost = sol_required.checked_add(fee).ok_or(FeeError::Overflow)?;
    Ok(BuyFee { fee, total_cost })
}

/// Apply the sell-side fee to curve proceeds
///
/// # Algorithm
///
/// ```text
/// fee        = floor(gross_output * fee_bps / 10000)
/// net_output = gross_output - fee
/// ```
pub fn apply_sell_fee(gross_output: Amount, fee_bps: Bps) -> FeeResult<SellFee> {
    let fee = compute_fee(gross_output, fee_bps)?;
    // fee <= gross_output whenever fee_bps < 10000
    let net_output = gross_output.checked_sub(fee).ok_or(FeeError::Overflow)?;
    Ok(SellFee { fee, net_output })
}

/// Split the fee on `base` between protocol and creator
///
/// `total` matches `compute_fee(base, schedule.fee_basis_points)`, so the split
/// is purely informational for routing: it never changes what the trader pays.
pub fn split_fee(base: Amount, schedule: &FeeSchedule) -> FeeResult<FeeBreakdown> {
    validate_schedule(schedule)?;
    let total = compute_fee(base, schedule.fee_basis_points)?;
    let creator = compute_fee(base, schedule.creator_fee_basis_points)?;
    let protocol = total.checked_sub(creator).ok_or(FeeError::Overflow)?;
    Ok(FeeBreakdown {
        total,
        protocol,
        creator,
    })
}

// =============================================================================
// TESTS
// =============================================================================
