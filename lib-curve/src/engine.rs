//! Trade Engine
//!
//! The sole producer of new `CurveState` records from trades.
//!
//! # Validation Order
//!
//! Fixed, so the reported error is deterministic:
//!
//! 1. Completeness (`CurveComplete`)
//! 2. Amount (`InvalidAmount`)
//! 3. Liquidity and size (`InsufficientLiquidity`, `ExcessiveTradeSize`)
//! 4. Slippage (`SlippageExceeded`)
//!
//! # Accounting
//!
//! - Buy: trader pays `sol_required + fee`; `real_sol_reserves` grows by `sol_required`
//! - Sell: curve pays `sol_output`; trader receives `sol_output - fee`
//! - Fees never touch the reserves; they leave through transfer intents
//!
//! Every call is a pure function of `(state, inputs)`. A failed call returns
//! an error and nothing else.

use lib_fees::{apply_buy_fee, apply_sell_fee, split_fee, FeeBreakdown};
use lib_types::{Amount, BPS_DENOMINATOR};

use crate::config::EngineConfig;
use crate::errors::{CurveError, CurveResult};
use crate::math;
use crate::migration::{self, LiquiditySeed, MigrationStatus};
use crate::receipt::{TradeReceipt, TradeSide};
use crate::state::CurveState;

/// Orchestrates quotes and trades under one `EngineConfig`
#[derive(Debug, Clone)]
pub struct TradeEngine {
    config: EngineConfig,
}

impl TradeEngine {
    /// Create an engine, rejecting malformed configuration
    pub fn new(config: EngineConfig) -> CurveResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // QUOTES
    // =========================================================================

    /// Preview a buy of `token_amount` tokens without a cost ceiling
    pub fn quote_buy(&self, state: &CurveState, token_amount: Amount) -> CurveResult<TradeReceipt> {
        state.ensure_active()?;
        self.validate_amount(token_amount)?;

        let quote = math::quote_buy(state, token_amount, self.config.max_trade_fraction_bps)?;
        let buy_fee = apply_buy_fee(quote.sol_required, self.config.fees.fee_basis_points)?;
        let fee = split_fee(quote.sol_required, &self.config.fees)?;

        let next = state.after_buy(&quote)?;
        self.build_receipt(
            state,
            next,
            TradeSide::Buy,
            token_amount,
            quote.sol_required,
            fee,
            buy_fee.total_cost,
        )
    }

    /// Preview a sell of `token_amount` tokens without an output floor
    pub fn quote_sell(
        &self,
        state: &CurveState,
        token_amount: Amount,
    ) -> CurveResult<TradeReceipt> {
        state.ensure_active()?;
        self.validate_amount(token_amount)?;

        let quote = math::quote_sell(state, token_amount)?;
        let sell_fee = apply_sell_fee(quote.sol_output, self.config.fees.fee_basis_points)?;
        let fee = split_fee(quote.sol_output, &self.config.fees)?;

        let next = state.after_sell(&quote)?;
        self.build_receipt(
            state,
            next,
            TradeSide::Sell,
            token_amount,
            quote.sol_output,
            fee,
            sell_fee.net_output,
        )
    }

    /// Preview the buy a SOL budget affords, fee included
    ///
    /// The budget net of the fee rate is inverted through the curve and capped
    /// at the largest buy the curve accepts. The quoted `net_sol` never
    /// exceeds `sol_budget`.
    pub fn quote_buy_with_sol(
        &self,
        state: &CurveState,
        sol_budget: Amount,
    ) -> CurveResult<TradeReceipt> {
        state.ensure_active()?;
        if sol_budget == 0 {
            return Err(CurveError::InvalidAmount(
                "SOL budget must be greater than zero".to_string(),
            ));
        }

        let fee_bps = self.config.fees.fee_basis_points as u128;
        let denominator = BPS_DENOMINATOR as u128;
        // Never larger than sol_budget
        let curve_budget = ((sol_budget as u128) * denominator / (denominator + fee_bps)) as Amount;

        let max_buy = math::max_buy_amount(state, self.config.max_trade_fraction_bps)?;
        if max_buy == 0 {
            return Err(CurveError::InsufficientLiquidity(format!(
                "curve {} has no tokens left for sale",
                state.token_id
            )));
        }
        let token_amount = math::tokens_for_sol(state, curve_budget)?.min(max_buy);

        tracing::debug!(
            "Budget of {} lamports on {} buys {} tokens",
            sol_budget,
            state.token_id.short(),
            token_amount
        );
        self.quote_buy(state, token_amount)
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    /// Buy `token_amount` tokens paying at most `max_sol_cost` (fee included)
    ///
    /// Returns the next state and the receipt. The caller persists the state.
    pub fn execute_buy(
        &self,
        state: &CurveState,
        token_amount: Amount,
        max_sol_cost: Amount,
    ) -> CurveResult<(CurveState, TradeReceipt)> {
        let receipt = self
            .quote_buy(state, token_amount)
            .map_err(|err| rejected(state, TradeSide::Buy, token_amount, err))?;

        if receipt.net_sol > max_sol_cost {
            return Err(rejected(
                state,
                TradeSide::Buy,
                token_amount,
                CurveError::SlippageExceeded {
                    side: TradeSide::Buy,
                    actual: receipt.net_sol,
                    limit: max_sol_cost,
                },
            ));
        }

        self.log_execution(state, &receipt);
        Ok((receipt.state.clone(), receipt))
    }

    /// Sell `token_amount` tokens receiving at least `min_sol_output` (after fee)
    ///
    /// The seller's token balance is not checked here; custody confirms it.
    pub fn execute_sell(
        &self,
        state: &CurveState,
        token_amount: Amount,
        min_sol_output: Amount,
    ) -> CurveResult<(CurveState, TradeReceipt)> {
        let receipt = self
            .quote_sell(state, token_amount)
            .map_err(|err| rejected(state, TradeSide::Sell, token_amount, err))?;

        if receipt.net_sol < min_sol_output {
            return Err(rejected(
                state,
                TradeSide::Sell,
                token_amount,
                CurveError::SlippageExceeded {
                    side: TradeSide::Sell,
                    actual: receipt.net_sol,
                    limit: min_sol_output,
                },
            ));
        }

        self.log_execution(state, &receipt);
        Ok((receipt.state.clone(), receipt))
    }

    // =========================================================================
    // MIGRATION
    // =========================================================================

    /// Readiness against the configured threshold
    pub fn migration_status(&self, state: &CurveState) -> CurveResult<MigrationStatus> {
        migration::evaluate(state, self.config.migration_threshold_sol)
    }

    /// Mark `state` complete against the configured threshold
    pub fn complete_migration(&self, state: &CurveState) -> CurveResult<CurveState> {
        migration::complete_migration(state, self.config.migration_threshold_sol)
    }

    /// Pool seed under the configured threshold and liquidity share
    pub fn plan_liquidity_seed(&self, state: &CurveState) -> CurveResult<LiquiditySeed> {
        migration::plan_liquidity_seed(
            state,
            self.config.migration_threshold_sol,
            self.config.pool_liquidity_bps,
        )
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn validate_amount(&self, token_amount: Amount) -> CurveResult<()> {
        if token_amount == 0 {
            return Err(CurveError::InvalidAmount(
                "token amount must be greater than zero".to_string(),
            ));
        }
        if token_amount < self.config.min_trade_amount {
            return Err(CurveError::InvalidAmount(format!(
                "token amount {} below minimum {}",
                token_amount, self.config.min_trade_amount
            )));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_receipt(
        &self,
        before: &CurveState,
        after: CurveState,
        side: TradeSide,
        token_amount: Amount,
        gross_sol: Amount,
        fee: FeeBreakdown,
        net_sol: Amount,
    ) -> CurveResult<TradeReceipt> {
        after.check_invariants()?;

        let price_before = before.spot_price()?;
        let price_after = after.spot_price()?;
        let migration_ready = self.migration_status(&after)?.can_migrate;

        Ok(TradeReceipt {
            token_id: before.token_id,
            side,
            token_amount,
            gross_sol,
            fee,
            net_sol,
            price_before,
            price_after,
            price_impact_bps: math::price_impact_bps(price_before, price_after),
            migration_ready,
            state: after,
        })
    }

    fn log_execution(&self, before: &CurveState, receipt: &TradeReceipt) {
        tracing::info!(
            "Executed {} on {}: {} tokens, {} lamports net (fee {}), price {} -> {}",
            receipt.side,
            receipt.token_id.short(),
            receipt.token_amount,
            receipt.net_sol,
            receipt.fee.total,
            receipt.price_before,
            receipt.price_after
        );

        let threshold = self.config.migration_threshold_sol;
        if receipt.migration_ready && before.real_sol_reserves < threshold {
            tracing::info!(
                "Curve {} reached migration threshold: {} of {} lamports",
                receipt.token_id.short(),
                receipt.state.real_sol_reserves,
                threshold
            );
        }
    }
}

fn rejected(
    state: &CurveState,
    side: TradeSide,
    token_amount: Amount,
    err: CurveError,
) -> CurveError {
    tracing::debug!(
        "Rejected {} of {} tokens on {}: {}",
        side,
        token_amount,
        state.token_id.short(),
        err
    );
    err
}
