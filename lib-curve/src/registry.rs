//! Curve Registry
//!
//! Lookup and persistence boundary for `CurveState` records, plus an
//! in-memory index with phase queries.
//!
//! # Optimistic Versioning
//!
//! `save` accepts a record only if its `sequence` is exactly one above the
//! stored one. A writer that computed its trade from a stale record gets
//! `Conflict` and must reload; two trades can never both land on the same
//! starting state.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lib_types::{Amount, TokenId};

use crate::errors::CurveError;
use crate::migration;
use crate::state::{CurveState, Phase};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Curve {0} not found")]
    NotFound(TokenId),

    #[error("Curve {0} already registered")]
    AlreadyRegistered(TokenId),

    #[error("Version conflict on curve {token_id}: stored sequence {stored}, attempted {attempted}")]
    Conflict {
        token_id: TokenId,
        stored: u64,
        attempted: u64,
    },

    #[error("Rejected curve state: {0}")]
    InvalidState(#[from] CurveError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Persistence of curve records by token
///
/// Implementations must make `save` atomic with respect to `load`.
pub trait CurveRegistry: Send + Sync {
    /// Current record for `token_id`
    fn load(&self, token_id: &TokenId) -> RegistryResult<CurveState>;

    /// Replace the stored record with `state`
    ///
    /// Fails with `Conflict` unless `state.sequence == stored.sequence + 1`.
    fn save(&self, state: CurveState) -> RegistryResult<()>;
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_registered: u64,
    pub active: u64,
    pub complete: u64,
    /// Real SOL held across every curve
    pub total_real_sol: u128,
    pub total_saves: u64,
    pub total_conflicts: u64,
}

#[derive(Debug, Default)]
struct RegistryInner {
    curves: HashMap<TokenId, CurveState>,
    total_saves: u64,
    total_conflicts: u64,
}

/// In-memory `CurveRegistry`
#[derive(Debug, Default)]
pub struct InMemoryCurveRegistry {
    inner: RwLock<RegistryInner>,
}

impl InMemoryCurveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly launched curve
    pub fn register(&self, state: CurveState) -> RegistryResult<()> {
        state.check_invariants()?;

        let mut inner = self.inner.write();
        if inner.curves.contains_key(&state.token_id) {
            return Err(RegistryError::AlreadyRegistered(state.token_id));
        }

        tracing::debug!(
            "Registered curve {} at sequence {}",
            state.token_id.short(),
            state.sequence
        );
        inner.curves.insert(state.token_id, state);
        Ok(())
    }

    pub fn contains(&self, token_id: &TokenId) -> bool {
        self.inner.read().curves.contains_key(token_id)
    }

    pub fn total_count(&self) -> usize {
        self.inner.read().curves.len()
    }

    /// All curves in `phase`, ordered by token id
    pub fn list_by_phase(&self, phase: Phase) -> Vec<CurveState> {
        let inner = self.inner.read();
        let mut curves: Vec<CurveState> = inner
            .curves
            .values()
            .filter(|state| state.phase() == phase)
            .cloned()
            .collect();
        curves.sort_by(|a, b| a.token_id.as_bytes().cmp(b.token_id.as_bytes()));
        curves
    }

    /// Active curves whose real SOL meets `threshold_sol`, ordered by token id
    pub fn ready_to_migrate(&self, threshold_sol: Amount) -> RegistryResult<Vec<CurveState>> {
        let mut ready = Vec::new();
        for state in self.list_by_phase(Phase::Active) {
            if migration::evaluate(&state, threshold_sol)?.can_migrate {
                ready.push(state);
            }
        }
        Ok(ready)
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.read();
        let mut stats = RegistryStats {
            total_registered: inner.curves.len() as u64,
            total_saves: inner.total_saves,
            total_conflicts: inner.total_conflicts,
            ..RegistryStats::default()
        };
        for state in inner.curves.values() {
            match state.phase() {
                Phase::Active => stats.active += 1,
                Phase::Complete => stats.complete += 1,
            }
            stats.total_real_sol += state.real_sol_reserves as u128;
        }
        stats
    }
}

impl CurveRegistry for InMemoryCurveRegistry {
    fn load(&self, token_id: &TokenId) -> RegistryResult<CurveState> {
        self.inner
            .read()
            .curves
            .get(token_id)
            .cloned()
            .ok_or(RegistryError::NotFound(*token_id))
    }

    fn save(&self, state: CurveState) -> RegistryResult<()> {
        state.check_invariants()?;

        let mut inner = self.inner.write();
        let stored = inner
            .curves
            .get(&state.token_id)
            .map(|current| current.sequence)
            .ok_or(RegistryError::NotFound(state.token_id))?;

        if stored.checked_add(1) != Some(state.sequence) {
            inner.total_conflicts += 1;
            return Err(RegistryError::Conflict {
                token_id: state.token_id,
                stored,
                attempted: state.sequence,
            });
        }

        inner.total_saves += 1;
        inner.curves.insert(state.token_id, state);
        Ok(())
    }
}
