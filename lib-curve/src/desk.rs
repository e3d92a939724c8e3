//! Trade Desk
//!
//! Caller-side read-modify-write loop around `TradeEngine`:
//!
//! ```text
//!   lock(token) ─▶ registry.load ─▶ engine.execute_* ─▶ registry.save ─▶ unlock
//! ```
//!
//! Trades on one token are serialized by a per-token mutex; trades on
//! different tokens run in parallel. A token's mutex lives only while some
//! call holds it. The registry's sequence check still catches any writer
//! that bypasses the desk. The desk never retries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use lib_types::{Amount, TokenId};

use crate::engine::TradeEngine;
use crate::errors::CurveError;
use crate::migration::{LiquiditySeed, MigrationStatus};
use crate::receipt::TradeReceipt;
use crate::registry::{CurveRegistry, RegistryError};
use crate::state::CurveState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type DeskResult<T> = Result<T, DeskError>;

/// Serialized trading against a `CurveRegistry`
pub struct TradeDesk<R: CurveRegistry> {
    engine: TradeEngine,
    registry: R,
    locks: Mutex<HashMap<TokenId, Arc<Mutex<()>>>>,
}

impl<R: CurveRegistry> TradeDesk<R> {
    pub fn new(engine: TradeEngine, registry: R) -> Self {
        Self {
            engine,
            registry,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &TradeEngine {
        &self.engine
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn buy(
        &self,
        token_id: &TokenId,
        token_amount: Amount,
        max_sol_cost: Amount,
    ) -> DeskResult<TradeReceipt> {
        self.with_token_lock(token_id, || {
            let state = self.registry.load(token_id)?;
            let (next, receipt) = self.engine.execute_buy(&state, token_amount, max_sol_cost)?;
            self.persist(next)?;
            Ok(receipt)
        })
    }

    /// Buy as many tokens as `sol_budget` affords, fee included
    pub fn buy_with_sol(&self, token_id: &TokenId, sol_budget: Amount) -> DeskResult<TradeReceipt> {
        self.with_token_lock(token_id, || {
            let state = self.registry.load(token_id)?;
            let quote = self.engine.quote_buy_with_sol(&state, sol_budget)?;
            let (next, receipt) = self
                .engine
                .execute_buy(&state, quote.token_amount, sol_budget)?;
            self.persist(next)?;
            Ok(receipt)
        })
    }

    pub fn sell(
        &self,
        token_id: &TokenId,
        token_amount: Amount,
        min_sol_output: Amount,
    ) -> DeskResult<TradeReceipt> {
        self.with_token_lock(token_id, || {
            let state = self.registry.load(token_id)?;
            let (next, receipt) = self
                .engine
                .execute_sell(&state, token_amount, min_sol_output)?;
            self.persist(next)?;
            Ok(receipt)
        })
    }

    /// Preview a buy against the latest record; nothing is saved
    pub fn quote_buy(&self, token_id: &TokenId, token_amount: Amount) -> DeskResult<TradeReceipt> {
        let state = self.registry.load(token_id)?;
        Ok(self.engine.quote_buy(&state, token_amount)?)
    }

    /// Preview a sell against the latest record; nothing is saved
    pub fn quote_sell(&self, token_id: &TokenId, token_amount: Amount) -> DeskResult<TradeReceipt> {
        let state = self.registry.load(token_id)?;
        Ok(self.engine.quote_sell(&state, token_amount)?)
    }

    pub fn migration_status(&self, token_id: &TokenId) -> DeskResult<MigrationStatus> {
        let state = self.registry.load(token_id)?;
        Ok(self.engine.migration_status(&state)?)
    }

    /// Plan the pool seed and mark the curve complete in one step
    ///
    /// Returns the completed record and the seed the external pool must receive.
    pub fn finalize_migration(
        &self,
        token_id: &TokenId,
    ) -> DeskResult<(CurveState, LiquiditySeed)> {
        self.with_token_lock(token_id, || {
            let state = self.registry.load(token_id)?;
            let completed = self.engine.complete_migration(&state)?;
            let seed = self.engine.plan_liquidity_seed(&completed)?;
            self.persist(completed.clone())?;
            Ok((completed, seed))
        })
    }

    /// Run `f` holding `token_id`'s mutex, then drop the mutex if unused
    fn with_token_lock<T>(
        &self,
        token_id: &TokenId,
        f: impl FnOnce() -> DeskResult<T>,
    ) -> DeskResult<T> {
        let lock = self.locks.lock().entry(*token_id).or_default().clone();
        let result = {
            let _guard = lock.lock();
            f()
        };
        drop(lock);

        // Only the map's own reference left: no caller holds or waits on it
        let mut locks = self.locks.lock();
        if locks
            .get(token_id)
            .map_or(false, |entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(token_id);
        }
        result
    }

    fn persist(&self, state: CurveState) -> DeskResult<()> {
        let token_id = state.token_id;
        self.registry.save(state).map_err(|err| {
            if let RegistryError::Conflict { stored, attempted, .. } = &err {
                tracing::warn!(
                    "Concurrent write on curve {}: stored sequence {}, attempted {}",
                    token_id.short(),
                    stored,
                    attempted
                );
            }
            DeskError::from(err)
        })
    }
}
