//! Curve State
//!
//! The authoritative record of one token's curve.
//!
//! # State Machine
//! ```text
//!   ┌────────┐   migration executed (external)   ┌──────────┐
//!   │ Active │ ────────────────────────────────▶ │ Complete │
//!   └────────┘          (irreversible)           └──────────┘
//!      │  ▲
//!      └──┘ buy / sell
//! ```
//!
//! # Transitions
//! - Active → Active: a successful trade (`TradeEngine` only)
//! - Active → Complete: `migration::complete_migration`, once the threshold is met
//! - A rejected trade leaves the record untouched
//! - No reverse transition
//!
//! Every accepted transition bumps `sequence` by exactly one.

use std::fmt;

use serde::{Deserialize, Serialize};

use lib_types::{Address, Amount, TokenId};

use crate::config::LaunchParams;
use crate::errors::{CurveError, CurveResult};
use crate::math::{self, BuyQuote, Price, SellQuote};

/// Curve lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Curve pricing active; buys and sells accepted
    Active,
    /// Migrated to an external pool; terminal
    Complete,
}

impl Phase {
    /// Check if the curve accepts trades
    pub fn can_trade(&self) -> bool {
        matches!(self, Phase::Active)
    }

    /// Check if the curve has migrated
    pub fn is_complete(&self) -> bool {
        matches!(self, Phase::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Active => write!(f, "active"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// One token's curve: reserves, supply and completion flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveState {
    pub token_id: TokenId,
    /// Receives the creator share of trade fees
    pub creator: Address,

    // Virtual reserves (pricing only)
    pub virtual_token_reserves: Amount,
    pub virtual_sol_reserves: Amount,

    // Real reserves (held by the curve vault)
    pub real_token_reserves: Amount,
    /// Compared against the migration threshold; never includes fees
    pub real_sol_reserves: Amount,

    pub token_total_supply: Amount,
    /// Allocation that never passes through the curve
    pub reserved_tokens: Amount,

    pub complete: bool,
    /// Version of this record, bumped on every accepted transition
    pub sequence: u64,
}

/// Market snapshot of one curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveStats {
    pub spot_price: Price,
    /// Tokens bought out of the curve vault and not sold back
    pub tokens_sold: Amount,
    /// Tokens still for sale on the curve
    pub tokens_remaining: Amount,
    /// Everything outside the curve vault, reserved allocation included
    pub circulating_supply: Amount,
    /// `virtual_sol × circulating / virtual_token`, in lamports
    pub market_cap_lamports: u128,
    pub real_sol_reserves: Amount,
    pub phase: Phase,
}

impl CurveState {
    /// Create the record for a freshly launched token
    pub fn launch(token_id: TokenId, creator: Address, params: &LaunchParams) -> CurveResult<Self> {
        params.validate()?;

        let state = Self {
            token_id,
            creator,
            virtual_token_reserves: params.initial_virtual_token_reserves,
            virtual_sol_reserves: params.initial_virtual_sol_reserves,
            real_token_reserves: params.initial_real_token_reserves,
            real_sol_reserves: 0,
            token_total_supply: params.token_total_supply,
            reserved_tokens: params.reserved_tokens(),
            complete: false,
            sequence: 0,
        };

        tracing::debug!(
            "Launched curve {}: {} virtual SOL, {} virtual tokens, {} for sale",
            token_id.short(),
            state.virtual_sol_reserves,
            state.virtual_token_reserves,
            state.real_token_reserves
        );
        Ok(state)
    }

    pub fn phase(&self) -> Phase {
        if self.complete {
            Phase::Complete
        } else {
            Phase::Active
        }
    }

    /// Constant product `k` of the virtual reserves
    pub fn invariant(&self) -> u128 {
        math::invariant(self.virtual_sol_reserves, self.virtual_token_reserves)
    }

    pub fn spot_price(&self) -> CurveResult<Price> {
        math::price_at(self.virtual_sol_reserves, self.virtual_token_reserves)
    }

    /// Most real tokens the vault can ever hold
    pub fn curve_token_capacity(&self) -> Amount {
        self.token_total_supply.saturating_sub(self.reserved_tokens)
    }

    pub fn tokens_sold(&self) -> Amount {
        self.curve_token_capacity()
            .saturating_sub(self.real_token_reserves)
    }

    pub fn circulating_supply(&self) -> Amount {
        self.token_total_supply
            .saturating_sub(self.real_token_reserves)
    }

    /// Verify the structural invariants of the record
    pub fn check_invariants(&self) -> CurveResult<()> {
        if !self.complete && (self.virtual_sol_reserves == 0 || self.virtual_token_reserves == 0) {
            return Err(CurveError::InvariantViolation(format!(
                "active curve {} has empty virtual reserves (sol={}, token={})",
                self.token_id, self.virtual_sol_reserves, self.virtual_token_reserves
            )));
        }
        if self.reserved_tokens > self.token_total_supply {
            return Err(CurveError::InvariantViolation(format!(
                "reserved allocation {} exceeds total supply {}",
                self.reserved_tokens, self.token_total_supply
            )));
        }
        if self.real_token_reserves > self.curve_token_capacity() {
            return Err(CurveError::InvariantViolation(format!(
                "real token reserves {} exceed curve capacity {}",
                self.real_token_reserves,
                self.curve_token_capacity()
            )));
        }
        if !self.complete && self.real_token_reserves >= self.virtual_token_reserves {
            return Err(CurveError::InvariantViolation(format!(
                "real token reserves {} not below virtual reserves {}",
                self.real_token_reserves, self.virtual_token_reserves
            )));
        }
        Ok(())
    }

    pub fn stats(&self) -> CurveResult<CurveStats> {
        let spot_price = self.spot_price()?;
        let circulating_supply = self.circulating_supply();
        let market_cap_lamports = (self.virtual_sol_reserves as u128)
            * (circulating_supply as u128)
            / (self.virtual_token_reserves as u128);

        Ok(CurveStats {
            spot_price,
            tokens_sold: self.tokens_sold(),
            tokens_remaining: self.real_token_reserves,
            circulating_supply,
            market_cap_lamports,
            real_sol_reserves: self.real_sol_reserves,
            phase: self.phase(),
        })
    }

    // ===== TRANSITIONS (crate-internal) =====

    pub(crate) fn ensure_active(&self) -> CurveResult<()> {
        if self.complete {
            return Err(CurveError::CurveComplete(self.token_id));
        }
        Ok(())
    }

    /// Record after a buy: the curve receives `sol_required`, never the fee
    pub(crate) fn after_buy(&self, quote: &BuyQuote) -> CurveResult<Self> {
        Ok(Self {
            virtual_sol_reserves: quote.new_virtual_sol,
            virtual_token_reserves: quote.new_virtual_token,
            real_token_reserves: self
                .real_token_reserves
                .checked_sub(quote.token_amount)
                .ok_or(CurveError::Overflow)?,
            real_sol_reserves: self
                .real_sol_reserves
                .checked_add(quote.sol_required)
                .ok_or(CurveError::Overflow)?,
            sequence: self.next_sequence()?,
            ..self.clone()
        })
    }

    /// Record after a sell: the curve pays the gross output
    pub(crate) fn after_sell(&self, quote: &SellQuote) -> CurveResult<Self> {
        Ok(Self {
            virtual_sol_reserves: quote.new_virtual_sol,
            virtual_token_reserves: quote.new_virtual_token,
            real_token_reserves: self
                .real_token_reserves
                .checked_add(quote.token_amount)
                .ok_or(CurveError::Overflow)?,
            real_sol_reserves: self
                .real_sol_reserves
                .checked_sub(quote.sol_output)
                .ok_or(CurveError::Overflow)?,
            sequence: self.next_sequence()?,
            ..self.clone()
        })
    }

    pub(crate) fn completed(&self) -> CurveResult<Self> {
        Ok(Self {
            complete: true,
            sequence: self.next_sequence()?,
            ..self.clone()
        })
    }

    fn next_sequence(&self) -> CurveResult<u64> {
        self.sequence.checked_add(1).ok_or(CurveError::Overflow)
    }
}
