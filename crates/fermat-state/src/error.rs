use fermat_consensus::ConsensusError;
use thiserror::Error;

/// Errors from chain state operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error("Genesis header must have height 0, got {0}")]
    InvalidGenesis(u32),

    #[error("Cannot truncate to height {target}, tip is {tip}")]
    TruncateBeyondTip { target: u32, tip: u32 },
}

pub type StateResult<T> = Result<T, StateError>;
