//! Curve Engine Errors

use thiserror::Error;

use lib_fees::FeeError;
use lib_types::{Amount, TokenId};

use crate::receipt::TradeSide;

/// Error during curve pricing, trading or migration evaluation
///
/// Every variant is returned before any state is produced: a failed call
/// never yields a partially updated `CurveState`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("Division by zero: degenerate reserves (virtual_sol={virtual_sol}, virtual_token={virtual_token})")]
    DivisionByZero {
        virtual_sol: Amount,
        virtual_token: Amount,
    },

    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    #[error("Trade of {requested} tokens exceeds the per-trade limit of {limit}")]
    ExcessiveTradeSize { requested: Amount, limit: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Slippage exceeded on {side}: computed {actual} lamports, limit {limit}")]
    SlippageExceeded {
        side: TradeSide,
        actual: Amount,
        limit: Amount,
    },

    #[error("Curve {0} is complete; trade on the migrated pool")]
    CurveComplete(TokenId),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Migration threshold not met: {current} of {required} lamports")]
    ThresholdNotMet { current: Amount, required: Amount },

    #[error("Curve state invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

impl CurveError {
    /// Whether the caller can succeed by changing the request
    ///
    /// Liquidity, size and slippage failures are fixed by re-quoting with a
    /// smaller amount or wider limit; an unmet migration threshold clears once
    /// the curve has collected more SOL. Everything else is permanent
    /// (`CurveComplete`), a caller bug (`InvalidAmount`, `InvalidConfiguration`)
    /// or a corrupt record (`DivisionByZero`, `InvariantViolation`, `Overflow`).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CurveError::InsufficientLiquidity(_)
                | CurveError::ExcessiveTradeSize { .. }
                | CurveError::SlippageExceeded { .. }
                | CurveError::ThresholdNotMet { .. }
        )
    }
}

impl From<FeeError> for CurveError {
    fn from(err: FeeError) -> Self {
        match err {
            FeeError::Overflow => CurveError::Overflow,
            other => CurveError::InvalidConfiguration(other.to_string()),
        }
    }
}

/// Result type for curve operations
pub type CurveResult<T> = Result<T, CurveError>;
