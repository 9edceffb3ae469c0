//! Error types for consensus validation.

use thiserror::Error;

/// Consensus validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// Invalid block header.
    #[error("Invalid block header: {0}")]
    InvalidHeader(String),

    /// Invalid difficulty.
    #[error("Invalid difficulty: got {got}, expected {expected}")]
    InvalidDifficulty { got: u32, expected: u32 },

    /// Queried height is beyond the known tip. Caller precondition violation.
    #[error("Unknown height {height}: chain tip is at {tip}")]
    UnknownHeight { height: u32, tip: u32 },

    /// A header the chain view should hold is missing.
    #[error("Missing header at height {0}")]
    MissingHeader(u32),

    /// Invalid timestamp.
    #[error("Invalid timestamp: block {block_time}, expected after {parent_time}")]
    InvalidTimestamp { block_time: u64, parent_time: u64 },
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
