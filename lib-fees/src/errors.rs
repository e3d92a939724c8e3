//! Fee Model Errors

use thiserror::Error;

use lib_types::Bps;

/// Error during fee computation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("Fee basis points {bps} out of range [0, 10000)")]
    BasisPointsOutOfRange { bps: Bps },

    #[error("Creator fee {creator_bps} bps exceeds total fee {fee_bps} bps")]
    CreatorShareExceedsFee { creator_bps: Bps, fee_bps: Bps },

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for fee operations
pub type FeeResult<T> = Result<T, FeeError>;
