//! # fermat-consensus
//!
//! Consensus rules for the Fermat blockchain.
//!
//! This crate provides:
//! - Versionbits soft-fork deployment tracking (DEFINED -> STARTED ->
//!   LOCKED_IN -> ACTIVE)
//! - Difficulty adjustment: the interim banded DAA gated behind the
//!   `interim_daa` deployment, and the legacy continuous retarget
//! - Header validation against the required difficulty
//!
//! ## Difficulty encoding
//!
//! Fermat's proof of work is integer factoring: `bits` in a header is the
//! bit length of the semiprime a miner must factor, so difficulty is a
//! directly-adjustable integer level rather than a compact 256-bit target.
//! The interim DAA moves it by a fixed even step per 42-block period; the
//! legacy DAA retargets continuously every 672 blocks.
//!
//! All functions here are pure over an immutable [`ChainView`] snapshot:
//! identical history in, identical answer out.

mod chain_params;
mod difficulty;
mod error;
mod header;
mod validation;
mod versionbits;

pub use chain_params::{
    ActivationPoint, ChainParams, ChainParamsConfig, ChainParamsError, DeploymentParams,
};
pub use difficulty::{next_required_bits, DaaMode, DifficultyEngine};
pub use error::{ConsensusError, ConsensusResult};
pub use header::{ChainView, Header};
pub use validation::HeaderValidator;
pub use versionbits::{
    deployment_info, deployment_status, signals_deployment, DeploymentInfo, DeploymentStatus,
    ThresholdState, VERSIONBITS_TOP_BITS, VERSIONBITS_TOP_MASK,
};
