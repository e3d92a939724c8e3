//! Trade Receipts and Transfer Intents
//!
//! A receipt is the engine's account of one trade. It is ephemeral: the
//! engine never persists it. `transfers` turns it into the asset movements
//! an external signer has to perform.

use std::fmt;

use serde::{Deserialize, Serialize};

use lib_fees::FeeBreakdown;
use lib_types::{Address, Amount, TokenId};

use crate::math::{Price, PRICE_SCALE};
use crate::state::CurveState;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Result of one buy or sell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub token_id: TokenId,
    pub side: TradeSide,
    pub token_amount: Amount,
    /// SOL entering (buy) or leaving (sell) the curve reserves
    pub gross_sol: Amount,
    pub fee: FeeBreakdown,
    /// SOL the trader pays (buy) or receives (sell), fee included
    pub net_sol: Amount,
    pub price_before: Price,
    pub price_after: Price,
    pub price_impact_bps: u32,
    /// Post-trade state meets the migration threshold
    pub migration_ready: bool,
    /// Post-trade snapshot; persisting it is the caller's job
    pub state: CurveState,
}

impl TradeReceipt {
    /// Effective lamports per token base unit the trader got, fee included
    pub fn average_price(&self) -> Price {
        if self.token_amount == 0 {
            return Price::default();
        }
        Price((self.net_sol as u128) * PRICE_SCALE / (self.token_amount as u128))
    }

    pub fn price_impact_percent(&self) -> f64 {
        self.price_impact_bps as f64 / 100.0
    }

    /// Asset movements needed to settle this trade for `trader`
    ///
    /// Zero-amount fee legs are omitted. SOL legs add up exactly: a buyer
    /// sends `net_sol` in total, the curve vault sends out `gross_sol` on a sell.
    pub fn transfers(&self, trader: Address) -> Vec<TransferIntent> {
        let vault = Party::CurveVault(self.token_id);
        let trader = Party::Trader(trader);
        let creator = Party::Creator(self.state.creator);
        let token = Asset::Token(self.token_id);

        let mut intents = Vec::with_capacity(4);
        match self.side {
            TradeSide::Buy => {
                intents.push(TransferIntent::new(Asset::Sol, trader, vault, self.gross_sol));
                push_fee(&mut intents, trader, Party::FeeVault, self.fee.protocol);
                push_fee(&mut intents, trader, creator, self.fee.creator);
                intents.push(TransferIntent::new(token, vault, trader, self.token_amount));
            }
            TradeSide::Sell => {
                intents.push(TransferIntent::new(token, trader, vault, self.token_amount));
                intents.push(TransferIntent::new(Asset::Sol, vault, trader, self.net_sol));
                push_fee(&mut intents, vault, Party::FeeVault, self.fee.protocol);
                push_fee(&mut intents, vault, creator, self.fee.creator);
            }
        }
        intents
    }
}

fn push_fee(intents: &mut Vec<TransferIntent>, from: Party, to: Party, amount: Amount) {
    if amount > 0 {
        intents.push(TransferIntent::new(Asset::Sol, from, to, amount));
    }
}

// =============================================================================
// TRANSFER INTENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Sol,
    Token(TokenId),
}

/// Account taking part in a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Trader(Address),
    /// Vault holding one curve's real reserves
    CurveVault(TokenId),
    /// Protocol fee receiver
    FeeVault,
    Creator(Address),
}

/// One movement the signer/broadcaster must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub asset: Asset,
    pub from: Party,
    pub to: Party,
    pub amount: Amount,
}

impl TransferIntent {
    pub fn new(asset: Asset, from: Party, to: Party, amount: Amount) -> Self {
        Self {
            asset,
            from,
            to,
            amount,
        }
    }
}
