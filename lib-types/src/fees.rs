//! Fee primitives for the curve engine.
//!
//! Pure data types for fee calculation. Behavior (computation logic) lives in lib-fees.
//!
//! Rule: These types must remain behavior-free and serialization-stable.

use serde::{Deserialize, Serialize};

use crate::primitives::Bps;

/// Fee schedule applied to every curve trade
///
/// The creator share is carved out of the protocol fee, never added on top:
/// `creator_fee_basis_points <= fee_basis_points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Total trade fee in basis points (100 = 1%), must be < 10000
    pub fee_basis_points: Bps,
    /// Portion of the trade fee routed to the curve creator
    pub creator_fee_basis_points: Bps,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            fee_basis_points: 100,
            creator_fee_basis_points: 0,
        }
    }
}
