//! Constant-Product Curve Math
//!
//! Pure functions over the virtual reserves of one curve. No side effects,
//! no I/O, no floats.
//!
//! # Invariant
//!
//! ```text
//! k = virtual_sol_reserves × virtual_token_reserves
//! ```
//!
//! `k` is formed in u128 (two u64 reserves can never wrap it). Both
//! directions compute `new_virtual_sol = ceil(k / new_virtual_token)`, so
//! `k <= new_sol × new_token < k + new_token` after every trade:
//!
//! - Buy cost `new_sol - sol` rounds **up**
//! - Sell output `sol - new_sol` rounds **down**
//!
//! `k` never decreases, so the curve never under-collects and never
//! over-pays. SOL taken in by buys always covers selling the same tokens back.

use std::fmt;

use serde::{Deserialize, Serialize};

use lib_types::{Amount, Bps, BPS_DENOMINATOR};

use crate::errors::{CurveError, CurveResult};
use crate::state::CurveState;

/// Fixed-point scale of `Price`
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

// =============================================================================
// PRICE
// =============================================================================

/// Lamports per token base unit, scaled by `PRICE_SCALE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Price(pub u128);

impl Price {
    /// Raw fixed-point value
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Price of `ratio_num / ratio_den`, rounded down
    fn from_ratio(ratio_num: Amount, ratio_den: Amount) -> Price {
        // ratio_num <= u64::MAX, so ratio_num * 1e18 < 2^128
        Price((ratio_num as u128) * PRICE_SCALE / (ratio_den as u128))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / PRICE_SCALE, self.0 % PRICE_SCALE)
    }
}

// =============================================================================
// QUOTES
// =============================================================================

/// Raw curve result of buying `token_amount` tokens (before fees)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyQuote {
    pub token_amount: Amount,
    /// SOL the curve must receive (rounded up)
    pub sol_required: Amount,
    pub new_virtual_sol: Amount,
    pub new_virtual_token: Amount,
}

/// Raw curve result of selling `token_amount` tokens (before fees)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellQuote {
    pub token_amount: Amount,
    /// SOL the curve pays out (rounded down)
    pub sol_output: Amount,
    pub new_virtual_sol: Amount,
    pub new_virtual_token: Amount,
}

// =============================================================================
// PURE FUNCTIONS
// =============================================================================

/// Spot price `virtual_sol / virtual_token`
pub fn price_at(virtual_sol: Amount, virtual_token: Amount) -> CurveResult<Price> {
    if virtual_token == 0 {
        return Err(CurveError::DivisionByZero {
            virtual_sol,
            virtual_token,
        });
    }
    Ok(Price::from_ratio(virtual_sol, virtual_token))
}

/// Constant product of two reserves
pub fn invariant(virtual_sol: Amount, virtual_token: Amount) -> u128 {
    (virtual_sol as u128) * (virtual_token as u128)
}

/// Magnitude of the move from `before` to `after`, in basis points (rounded down)
pub fn price_impact_bps(before: Price, after: Price) -> u32 {
    if before.0 == 0 {
        return 0;
    }
    let delta = before.0.abs_diff(after.0);
    let bps = delta.saturating_mul(BPS_DENOMINATOR as u128) / before.0;
    u32::try_from(bps).unwrap_or(u32::MAX)
}

/// Largest buy `state` accepts under a trade-size limit
///
/// Bounded by the real tokens in the vault, by `max_trade_fraction_bps` of the
/// virtual reserves, and by `virtual_token - 1` so the curve never empties.
pub fn max_buy_amount(state: &CurveState, max_trade_fraction_bps: Bps) -> CurveResult<Amount> {
    let (_, virtual_token) = tradable_reserves(state)?;
    let fraction_limit = trade_size_limit(virtual_token, max_trade_fraction_bps)?;
    Ok(fraction_limit
        .min(state.real_token_reserves)
        .min(virtual_token - 1))
}

/// Quote a buy of exactly `token_amount` tokens
///
/// # Algorithm
///
/// ```text
/// k                 = virtual_sol × virtual_token
/// new_virtual_token = virtual_token − token_amount
/// new_virtual_sol   = ceil(k / new_virtual_token)
/// sol_required      = new_virtual_sol − virtual_sol
/// ```
///
/// # Errors
///
/// Checked in this order:
/// - `DivisionByZero` if either virtual reserve is zero
/// - `InsufficientLiquidity` if the buy would empty the virtual token reserves
/// - `ExcessiveTradeSize` if `token_amount` exceeds `max_trade_fraction_bps` of them
/// - `InsufficientLiquidity` if the vault holds fewer real tokens
pub fn quote_buy(
    state: &CurveState,
    token_amount: Amount,
    max_trade_fraction_bps: Bps,
) -> CurveResult<BuyQuote> {
    let (virtual_sol, virtual_token) = tradable_reserves(state)?;

    if token_amount >= virtual_token {
        return Err(CurveError::InsufficientLiquidity(format!(
            "buy of {} tokens would drain virtual reserves of {}",
            token_amount, virtual_token
        )));
    }

    let limit = trade_size_limit(virtual_token, max_trade_fraction_bps)?;
    if token_amount > limit {
        return Err(CurveError::ExcessiveTradeSize {
            requested: token_amount,
            limit,
        });
    }

    if token_amount > state.real_token_reserves {
        return Err(CurveError::InsufficientLiquidity(format!(
            "buy of {} tokens exceeds {} real tokens left on the curve",
            token_amount, state.real_token_reserves
        )));
    }

    let k = invariant(virtual_sol, virtual_token);
    let new_virtual_token = virtual_token - token_amount;
    let new_virtual_sol = div_ceil(k, new_virtual_token as u128);
    let new_virtual_sol = Amount::try_from(new_virtual_sol).map_err(|_| CurveError::Overflow)?;

    // k / new_virtual_token > virtual_sol whenever token_amount > 0
    let sol_required = new_virtual_sol
        .checked_sub(virtual_sol)
        .ok_or(CurveError::Overflow)?;

    Ok(BuyQuote {
        token_amount,
        sol_required,
        new_virtual_sol,
        new_virtual_token,
    })
}

/// Quote a sell of exactly `token_amount` tokens
///
/// # Algorithm
///
/// ```text
/// k                 = virtual_sol × virtual_token
/// new_virtual_token = virtual_token + token_amount
/// new_virtual_sol   = ceil(k / new_virtual_token)
/// sol_output        = virtual_sol − new_virtual_sol
/// ```
///
/// # Errors
///
/// - `DivisionByZero` if either virtual reserve is zero
/// - `InsufficientLiquidity` if more tokens come back than the curve ever
///   sold, or the payout exceeds the real SOL in the vault
pub fn quote_sell(state: &CurveState, token_amount: Amount) -> CurveResult<SellQuote> {
    let (virtual_sol, virtual_token) = tradable_reserves(state)?;

    let new_virtual_token = virtual_token
        .checked_add(token_amount)
        .ok_or(CurveError::Overflow)?;

    let capacity = state.curve_token_capacity();
    let returned = state
        .real_token_reserves
        .checked_add(token_amount)
        .ok_or(CurveError::Overflow)?;
    if returned > capacity {
        return Err(CurveError::InsufficientLiquidity(format!(
            "sell of {} tokens would lift real token reserves to {} above capacity {}",
            token_amount, returned, capacity
        )));
    }

    let k = invariant(virtual_sol, virtual_token);
    // k / new_virtual_token <= virtual_sol, so the ceiling fits in u64
    let new_virtual_sol = div_ceil(k, new_virtual_token as u128);
    let new_virtual_sol = Amount::try_from(new_virtual_sol).map_err(|_| CurveError::Overflow)?;

    if new_virtual_sol > virtual_sol {
        return Err(CurveError::InsufficientLiquidity(format!(
            "sell of {} tokens yields negative output",
            token_amount
        )));
    }
    let sol_output = virtual_sol - new_virtual_sol;

    if sol_output > state.real_sol_reserves {
        return Err(CurveError::InsufficientLiquidity(format!(
            "sell pays {} lamports but the curve holds {}",
            sol_output, state.real_sol_reserves
        )));
    }

    Ok(SellQuote {
        token_amount,
        sol_output,
        new_virtual_sol,
        new_virtual_token,
    })
}

/// Tokens the curve releases for exactly `sol_amount` of curve cost (rounded down)
///
/// The inverse of `quote_buy`: buying the returned amount never costs more
/// than `sol_amount`. Trade-size and real-reserve limits are not applied here.
pub fn tokens_for_sol(state: &CurveState, sol_amount: Amount) -> CurveResult<Amount> {
    let (virtual_sol, virtual_token) = tradable_reserves(state)?;

    let new_virtual_sol = virtual_sol
        .checked_add(sol_amount)
        .ok_or(CurveError::Overflow)?;
    let k = invariant(virtual_sol, virtual_token);
    let new_virtual_token = div_ceil(k, new_virtual_sol as u128);

    // new_virtual_sol >= virtual_sol, so new_virtual_token <= virtual_token
    let new_virtual_token = Amount::try_from(new_virtual_token).map_err(|_| CurveError::Overflow)?;
    Ok(virtual_token.saturating_sub(new_virtual_token))
}

// =============================================================================
// HELPERS
// =============================================================================

fn tradable_reserves(state: &CurveState) -> CurveResult<(Amount, Amount)> {
    let virtual_sol = state.virtual_sol_reserves;
    let virtual_token = state.virtual_token_reserves;
    if virtual_sol == 0 || virtual_token == 0 {
        return Err(CurveError::DivisionByZero {
            virtual_sol,
            virtual_token,
        });
    }
    Ok((virtual_sol, virtual_token))
}

fn trade_size_limit(virtual_token: Amount, max_trade_fraction_bps: Bps) -> CurveResult<Amount> {
    if max_trade_fraction_bps == 0 || u64::from(max_trade_fraction_bps) > BPS_DENOMINATOR {
        return Err(CurveError::InvalidConfiguration(format!(
            "max_trade_fraction_bps {} out of range (0, 10000]",
            max_trade_fraction_bps
        )));
    }
    // Never larger than virtual_token
    let limit =
        (virtual_token as u128) * (max_trade_fraction_bps as u128) / (BPS_DENOMINATOR as u128);
    Ok(limit as Amount)
}

fn div_ceil(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    if numerator % denominator == 0 {
        quotient
    } else {
        quotient + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchParams;
    use lib_types::{Address, TokenId};

    fn fresh_curve() -> CurveState {
        CurveState::launch(
            TokenId::new([1u8; 32]),
            Address::new([2u8; 32]),
            &LaunchParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_price_at_launch() {
        let price = price_at(30_000_000_000, 1_073_000_000_000_000).unwrap();
        assert_eq!(price.raw(), 27_958_993_476_234);
        assert_eq!(price.to_string(), "0.000027958993476234");
    }

    #[test]
    fn test_price_at_zero_tokens() {
        assert_eq!(
            price_at(30, 0),
            Err(CurveError::DivisionByZero {
                virtual_sol: 30,
                virtual_token: 0
            })
        );
    }

    #[test]
    fn test_quote_buy_rounds_cost_up() {
        let state = fresh_curve();
        let quote = quote_buy(&state, 1_000_000_000, 5_000).unwrap();

        assert_eq!(quote.sol_required, 27_960);
        assert_eq!(quote.new_virtual_token, 1_072_999_000_000_000);
        assert_eq!(quote.new_virtual_sol, 30_000_027_960);

        let k = state.invariant();
        let after = invariant(quote.new_virtual_sol, quote.new_virtual_token);
        assert!(after >= k);
        assert!(after - k < quote.new_virtual_token as u128);
    }

    #[test]
    fn test_quote_sell_rounds_output_down() {
        let mut state = fresh_curve();
        // Pretend 100M tokens were bought so there is SOL to pay out
        let buy = quote_buy(&state, 100_000_000_000_000, 5_000).unwrap();
        state.virtual_sol_reserves = buy.new_virtual_sol;
        state.virtual_token_reserves = buy.new_virtual_token;
        state.real_token_reserves -= buy.token_amount;
        state.real_sol_reserves += buy.sol_required;

        let quote = quote_sell(&state, 1_000_000_000).unwrap();
        let k = state.invariant();
        let after = invariant(quote.new_virtual_sol, quote.new_virtual_token);
        assert!(after >= k);
        assert!(after - k < quote.new_virtual_token as u128);
        assert_eq!(quote.sol_output, state.virtual_sol_reserves - quote.new_virtual_sol);
    }

    #[test]
    fn test_quote_sell_inexact_payout_floored() {
        let mut state = fresh_curve();
        let buy = quote_buy(&state, 1_007_777_777, 5_000).unwrap();
        state.virtual_sol_reserves = buy.new_virtual_sol;
        state.virtual_token_reserves = buy.new_virtual_token;
        state.real_token_reserves -= buy.token_amount;
        state.real_sol_reserves += buy.sol_required;

        // Exact output is 121.156 lamports
        let quote = quote_sell(&state, 4_333_331).unwrap();
        assert_eq!(quote.sol_output, 121);
        assert!(invariant(quote.new_virtual_sol, quote.new_virtual_token) >= state.invariant());
    }

    #[test]
    fn test_buy_that_drains_reserves() {
        let state = fresh_curve();
        let result = quote_buy(&state, state.virtual_token_reserves, 10_000);
        assert!(matches!(result, Err(CurveError::InsufficientLiquidity(_))));
    }

    #[test]
    fn test_buy_over_fraction_limit() {
        let state = fresh_curve();
        // 50% of 1.073B tokens = 536.5M
        let result = quote_buy(&state, 536_500_000_000_001, 5_000);
        assert_eq!(
            result,
            Err(CurveError::ExcessiveTradeSize {
                requested: 536_500_000_000_001,
                limit: 536_500_000_000_000,
            })
        );
        assert!(quote_buy(&state, 536_500_000_000_000, 5_000).is_ok());
    }

    #[test]
    fn test_buy_beyond_real_reserves() {
        let state = fresh_curve();
        let result = quote_buy(&state, state.real_token_reserves + 1, 10_000);
        assert!(matches!(result, Err(CurveError::InsufficientLiquidity(_))));
    }

    #[test]
    fn test_sell_without_prior_buys_has_no_liquidity() {
        // Nothing was sold yet: returning tokens exceeds vault capacity
        let state = fresh_curve();
        let result = quote_sell(&state, 1_000_000);
        assert!(matches!(result, Err(CurveError::InsufficientLiquidity(_))));
    }

    #[test]
    fn test_sell_payout_bounded_by_real_sol() {
        let mut state = fresh_curve();
        let buy = quote_buy(&state, 1_000_000_000, 5_000).unwrap();
        state.virtual_sol_reserves = buy.new_virtual_sol;
        state.virtual_token_reserves = buy.new_virtual_token;
        state.real_token_reserves -= buy.token_amount;
        // Real SOL deliberately short of what the sell pays
        state.real_sol_reserves = 10;

        let result = quote_sell(&state, 1_000_000_000);
        assert!(matches!(result, Err(CurveError::InsufficientLiquidity(_))));
    }

    #[test]
    fn test_degenerate_reserves() {
        let mut state = fresh_curve();
        state.virtual_sol_reserves = 0;
        assert!(matches!(
            quote_buy(&state, 1, 5_000),
            Err(CurveError::DivisionByZero { .. })
        ));
        assert!(matches!(
            quote_sell(&state, 1),
            Err(CurveError::DivisionByZero { .. })
        ));
        assert!(matches!(
            tokens_for_sol(&state, 1),
            Err(CurveError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let state = fresh_curve();
        assert!(matches!(
            quote_buy(&state, 1, 0),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            quote_buy(&state, 1, 10_001),
            Err(CurveError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_tokens_for_sol_never_overcharges() {
        let state = fresh_curve();
        let tokens = tokens_for_sol(&state, 990_099_009).unwrap();
        assert_eq!(tokens, 34_281_150_129_545);

        let quote = quote_buy(&state, tokens, 10_000).unwrap();
        assert!(quote.sol_required <= 990_099_009);
        // One more token would cost more than the budget
        let over = quote_buy(&state, tokens + 1, 10_000).unwrap();
        assert!(over.sol_required > 990_099_009);
    }

    #[test]
    fn test_max_buy_amount() {
        let state = fresh_curve();
        assert_eq!(max_buy_amount(&state, 5_000).unwrap(), 536_500_000_000_000);
        assert_eq!(max_buy_amount(&state, 10_000).unwrap(), state.real_token_reserves);
    }

    #[test]
    fn test_price_impact() {
        assert_eq!(price_impact_bps(Price(10_000), Price(12_500)), 2_500);
        assert_eq!(price_impact_bps(Price(10_000), Price(7_500)), 2_500);
        assert_eq!(price_impact_bps(Price(10_000), Price(10_000)), 0);
        assert_eq!(price_impact_bps(Price(0), Price(1)), 0);
    }
}
