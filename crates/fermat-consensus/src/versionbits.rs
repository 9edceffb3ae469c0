//! Versionbits soft-fork deployment tracking.
//!
//! A deployment moves through DEFINED -> STARTED -> LOCKED_IN -> ACTIVE by
//! tallying signal bits over consecutive confirmation windows aligned to
//! multiples of the window size from genesis. The state is a pure function
//! of (chain history, tip, deployment parameters): transitions become
//! visible at the first height of the window after the one in which the
//! condition was met, and the state never moves backwards along a chain.
//!
//! ACTIVE is a permanent label. Whether the deployment's rule change is
//! still in force is a separate question answered by the difficulty engine
//! (see [`crate::DifficultyEngine::effective_algorithm`]).

use crate::chain_params::{ActivationPoint, DeploymentParams};
use crate::header::{check_tip, expect_header, ChainView};
use crate::ConsensusResult;
use serde::Serialize;
use tracing::debug;

/// Top marker bits that distinguish versionbits signaling from ordinary
/// version numbers.
pub const VERSIONBITS_TOP_BITS: u32 = 0x2000_0000;

/// Mask for the top marker bits.
pub const VERSIONBITS_TOP_MASK: u32 = 0xE000_0000;

/// Finite-state machine a deployment moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdState {
    /// Initial state for every deployment; genesis is DEFINED by definition.
    Defined,
    /// Signal counting is underway.
    Started,
    /// The threshold was met in a completed window; activation is one
    /// window away and needs no further signaling.
    LockedIn,
    /// Final state. Never exits.
    Active,
}

/// Deployment state at a tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentStatus {
    /// Current state.
    pub state: ThresholdState,
    /// First height of the window in which `state` took effect.
    /// For `Active` this is the activation height.
    pub since: u32,
}

impl DeploymentStatus {
    /// Whether the deployment has activated (the permanent label).
    pub fn is_active(&self) -> bool {
        self.state == ThresholdState::Active
    }
}

/// Externally-reported deployment status, shaped for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentInfo {
    /// Deployment mechanism; always `"versionbits"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Current state label.
    pub state: ThresholdState,
    /// True iff the state is `active`. Reflects the permanent label, not
    /// whether the rule change is still in force.
    pub active: bool,
    /// Activation height. Present only once active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u32>,
}

/// Whether a version field signals readiness for a deployment bit.
///
/// The top marker bits must match exactly; any other low bits set are
/// ignored so future deployments can signal concurrently.
pub fn signals_deployment(version: u32, bit: u8) -> bool {
    (version & VERSIONBITS_TOP_MASK) == VERSIONBITS_TOP_BITS && (version & (1u32 << bit)) != 0
}

/// Compute the deployment state at `tip_height`.
///
/// The returned state governs the block at `tip_height + 1`: exactly the
/// windows fully below that height feed the fold. Querying a tip beyond
/// the chain view is a caller error and fails fast.
pub fn deployment_status<C: ChainView + ?Sized>(
    chain: &C,
    tip_height: u32,
    params: &DeploymentParams,
) -> ConsensusResult<DeploymentStatus> {
    check_tip(chain, tip_height)?;

    let window = params.window;
    let completed_windows = (tip_height + 1) / window;

    let mut state = ThresholdState::Defined;
    let mut since = 0u32;

    for w in 0..completed_windows {
        let window_start = w * window;
        let boundary = window_start + window;

        let next = match state {
            ThresholdState::Defined => {
                if start_reached(chain, params, boundary)? {
                    ThresholdState::Started
                } else {
                    ThresholdState::Defined
                }
            }
            ThresholdState::Started => {
                let signals = count_signals(chain, params, window_start)?;
                if signals >= params.threshold {
                    debug!(
                        deployment = params.name,
                        signals,
                        threshold = params.threshold,
                        locked_in_at = boundary,
                        "Deployment threshold met"
                    );
                    ThresholdState::LockedIn
                } else {
                    ThresholdState::Started
                }
            }
            ThresholdState::LockedIn => ThresholdState::Active,
            ThresholdState::Active => break,
        };

        if next != state {
            state = next;
            since = boundary;
        }
    }

    Ok(DeploymentStatus { state, since })
}

/// Deployment status shaped for external status queries.
pub fn deployment_info<C: ChainView + ?Sized>(
    chain: &C,
    tip_height: u32,
    params: &DeploymentParams,
) -> ConsensusResult<DeploymentInfo> {
    let status = deployment_status(chain, tip_height, params)?;
    Ok(DeploymentInfo {
        kind: "versionbits",
        state: status.state,
        active: status.is_active(),
        since: status.is_active().then_some(status.since),
    })
}

/// Whether the start condition holds entering the window that begins at
/// `boundary`. Time-based starts read the last header of the completed
/// window, since the boundary header may not exist yet.
fn start_reached<C: ChainView + ?Sized>(
    chain: &C,
    params: &DeploymentParams,
    boundary: u32,
) -> ConsensusResult<bool> {
    match params.start {
        ActivationPoint::Height(h) => Ok(boundary >= h),
        ActivationPoint::Time(t) => {
            let last = expect_header(chain, boundary - 1)?;
            Ok(last.time >= t)
        }
    }
}

/// Count signaling headers in the window starting at `window_start`.
fn count_signals<C: ChainView + ?Sized>(
    chain: &C,
    params: &DeploymentParams,
    window_start: u32,
) -> ConsensusResult<u32> {
    let mut signals = 0u32;
    for height in window_start..window_start + params.window {
        let header = expect_header(chain, height)?;
        if signals_deployment(header.version, params.bit) {
            signals += 1;
        }
    }
    Ok(signals)
}
