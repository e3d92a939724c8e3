//! Golden Vector Tests for Curve Trades
//!
//! Exact integer results for reference trades on the default launch
//! parameters (30 SOL / 1.073B virtual, 793.1M for sale, 1% fee).
//! If any of these fail, what traders pay or receive has changed.
//!
//! # Updating Golden Vectors
//!
//! 1. Update the curve or fee computation
//! 2. Recompute and update these values
//! 3. Document the change in the commit message

#[cfg(test)]
mod tests {
    use lib_types::{Address, TokenId};

    use crate::{math, CurveState, EngineConfig, LaunchParams, TradeEngine};

    fn fresh_curve() -> CurveState {
        CurveState::launch(
            TokenId::new([0xAB; 32]),
            Address::new([0xCD; 32]),
            &LaunchParams::default(),
        )
        .unwrap()
    }

    fn engine() -> TradeEngine {
        TradeEngine::new(EngineConfig::default()).unwrap()
    }

    // =========================================================================
    // GOLDEN VECTOR: Launch price
    // =========================================================================

    /// Golden vector: 30e9 / 1.073e15 scaled by 1e18
    #[test]
    fn golden_launch_price() {
        let price = fresh_curve().spot_price().unwrap();

        // GOLDEN VECTOR: This exact value MUST NOT change
        assert_eq!(price.raw(), 27_958_993_476_234, "Golden vector mismatch: launch price");
    }

    // =========================================================================
    // GOLDEN VECTOR: First 1000-token buy
    // =========================================================================

    /// Golden vector: buy 1_000_000_000 units on a fresh curve
    ///
    /// - k = 30e9 × 1.073e15 = 32_190_000_000_000_000_000_000_000
    /// - new_virtual_token = 1_072_999_000_000_000
    /// - new_virtual_sol = ceil(k / new_virtual_token) = 30_000_027_960
    /// - sol_required = 27_960; fee = 279; total = 28_239
    #[test]
    fn golden_first_buy() {
        let receipt = engine().quote_buy(&fresh_curve(), 1_000_000_000).unwrap();

        // GOLDEN VECTOR: These exact values MUST NOT change
        assert_eq!(receipt.gross_sol, 27_960, "Golden vector mismatch: first_buy sol_required");
        assert_eq!(receipt.fee.total, 279, "Golden vector mismatch: first_buy fee");
        assert_eq!(receipt.net_sol, 28_239, "Golden vector mismatch: first_buy total_cost");
        assert_eq!(receipt.state.virtual_sol_reserves, 30_000_027_960);
        assert_eq!(receipt.price_after.raw(), 27_959_045_590_909);
        assert_eq!(receipt.price_impact_bps, 0);
    }

    /// Golden vector: selling the same 1000 tokens back
    ///
    /// - new_virtual_sol = ceil(k' / 1.073e15) = 30_000_000_001
    /// - gross = 27_959 (rounded down, one lamport stays in the curve)
    /// - fee = 279; net = 27_680
    /// - round-trip loss = 28_239 - 27_680 = 559 = both fees + 1
    #[test]
    fn golden_first_round_trip() {
        let engine = engine();
        let (bought, buy) = engine
            .execute_buy(&fresh_curve(), 1_000_000_000, u64::MAX)
            .unwrap();
        let (sold, sell) = engine.execute_sell(&bought, 1_000_000_000, 0).unwrap();

        // GOLDEN VECTOR: These exact values MUST NOT change
        assert_eq!(sell.gross_sol, 27_959, "Golden vector mismatch: sell_back gross");
        assert_eq!(sell.net_sol, 27_680, "Golden vector mismatch: sell_back net");
        assert_eq!(buy.net_sol - sell.net_sol, 559);
        assert_eq!(sold.real_sol_reserves, 1);
        assert_eq!(sold.virtual_sol_reserves, 30_000_000_001);
        assert_eq!(sold.virtual_token_reserves, 1_073_000_000_000_000);
    }

    // =========================================================================
    // GOLDEN VECTOR: 100M-token buy
    // =========================================================================

    /// Golden vector: buy 100_000_000_000_000 units on a fresh curve
    ///
    /// - new_virtual_token = 973_000_000_000_000
    /// - new_virtual_sol = 33_083_247_688
    /// - sol_required = 3_083_247_688; fee = 30_832_476
    /// - price impact 2161 bps
    #[test]
    fn golden_large_buy() {
        let receipt = engine()
            .quote_buy(&fresh_curve(), 100_000_000_000_000)
            .unwrap();

        assert_eq!(receipt.gross_sol, 3_083_247_688);
        assert_eq!(receipt.fee.total, 30_832_476);
        assert_eq!(receipt.net_sol, 3_114_080_164);
        assert_eq!(receipt.price_after.raw(), 34_001_282_310_380);
        assert_eq!(receipt.price_impact_bps, 2_161);
    }

    // =========================================================================
    // GOLDEN VECTOR: Draining the curve
    // =========================================================================

    /// Golden vector: all 793.1M curve tokens cost 85_005_359_057 lamports
    #[test]
    fn golden_full_curve_cost() {
        let state = fresh_curve();
        let quote = math::quote_buy(&state, state.real_token_reserves, 10_000).unwrap();

        assert_eq!(quote.sol_required, 85_005_359_057);
        assert_eq!(quote.new_virtual_token, 279_900_000_000_000);
        assert_eq!(quote.new_virtual_sol, 115_005_359_057);
    }

    /// Golden vector: 793_086_956_521_739 units cost exactly the 85 SOL threshold
    #[test]
    fn golden_threshold_buy() {
        let engine = TradeEngine::new(EngineConfig::for_testing()).unwrap();
        let receipt = engine
            .quote_buy(&fresh_curve(), 793_086_956_521_739)
            .unwrap();

        assert_eq!(receipt.gross_sol, 85_000_000_000);
        assert!(receipt.migration_ready);
    }

    // =========================================================================
    // GOLDEN VECTOR: Buy by SOL budget
    // =========================================================================

    /// Golden vector: 1 SOL budget at 1%
    ///
    /// - curve budget = floor(1e9 × 10000 / 10100) = 990_099_009
    /// - tokens = 34_281_150_129_545; total = 999_999_999
    #[test]
    fn golden_one_sol_budget() {
        let receipt = engine()
            .quote_buy_with_sol(&fresh_curve(), 1_000_000_000)
            .unwrap();

        assert_eq!(receipt.token_amount, 34_281_150_129_545);
        assert_eq!(receipt.gross_sol, 990_099_009);
        assert_eq!(receipt.net_sol, 999_999_999);
    }

    // =========================================================================
    // GOLDEN VECTOR: Launch market stats
    // =========================================================================

    /// Golden vector: 30e9 × 206.9e12 / 1.073e15 = 5_784_715_750 lamports
    #[test]
    fn golden_launch_market_cap() {
        let stats = fresh_curve().stats().unwrap();
        assert_eq!(stats.market_cap_lamports, 5_784_715_750);
        assert_eq!(stats.circulating_supply, 206_900_000_000_000);
    }
}
