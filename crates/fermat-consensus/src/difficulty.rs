//! Difficulty adjustment.
//!
//! The difficulty of a block is its `bits` field, the required bit length
//! of the semiprime to be factored. Two adjustment algorithms exist:
//!
//! * the legacy retarget, which recomputes bits once per
//!   [`ChainParams::legacy_interval`] blocks from the measured timespan, and
//! * the interim banded algorithm, which once per
//!   [`ChainParams::interim_period`] blocks moves bits by a small even step
//!   chosen from a fixed band table.
//!
//! Which algorithm applies at a given height is decided by the interim
//! deployment's versionbits state together with its automatic expiry: the
//! deployment label stays ACTIVE forever, but after `max_active_blocks`
//! blocks the engine reverts to the legacy retarget.
//!
//! All heights not on the applicable algorithm's boundary carry the tip's
//! bits forward unchanged.

use crate::chain_params::ChainParams;
use crate::header::{check_tip, expect_header, ChainView};
use crate::versionbits::deployment_status;
use crate::ConsensusResult;
use tracing::debug;

/// Band table for the interim algorithm, in thirtieths of the target
/// spacing. An average gap below 15/30 of the target earns the largest
/// increase, at 60/30 or above the largest decrease. Steps are even so
/// bits stays even.
const INTERIM_BANDS: [(u64, i64); 6] = [
    (15, 6),
    (20, 4),
    (27, 2),
    (31, 0),
    (45, -2),
    (60, -4),
];

/// Step applied when the average gap exceeds every band bound.
const INTERIM_FLOOR_STEP: i64 = -6;

/// Which adjustment algorithm is in force for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaaMode {
    /// The banded interim algorithm.
    Interim,
    /// The continuous legacy retarget.
    Legacy,
}

/// Computes required difficulty from chain history.
///
/// The engine is stateless; every query is a pure function of the chain
/// view and the parameters, so concurrent callers need no coordination.
pub struct DifficultyEngine<'a> {
    params: &'a ChainParams,
}

impl<'a> DifficultyEngine<'a> {
    pub fn new(params: &'a ChainParams) -> Self {
        Self { params }
    }

    /// The algorithm in force for the block after `tip_height`.
    ///
    /// Interim applies from the deployment's activation height until
    /// `max_active_blocks` blocks have been produced under it; from the
    /// expiry height on, legacy applies again even though the deployment
    /// label remains active.
    pub fn effective_algorithm<C: ChainView + ?Sized>(
        &self,
        chain: &C,
        tip_height: u32,
    ) -> ConsensusResult<DaaMode> {
        let status = deployment_status(chain, tip_height, &self.params.interim_daa)?;
        if !status.is_active() {
            return Ok(DaaMode::Legacy);
        }
        let next_height = tip_height + 1;
        match self.params.interim_daa.max_active_blocks {
            Some(max_active) if next_height >= status.since + max_active => Ok(DaaMode::Legacy),
            _ => Ok(DaaMode::Interim),
        }
    }

    /// Required bits for the block after `tip_height`.
    pub fn next_required_bits<C: ChainView + ?Sized>(
        &self,
        chain: &C,
        tip_height: u32,
    ) -> ConsensusResult<u32> {
        check_tip(chain, tip_height)?;
        let tip = expect_header(chain, tip_height)?;
        let next_height = tip_height + 1;

        match self.effective_algorithm(chain, tip_height)? {
            DaaMode::Interim if next_height % self.params.interim_period == 0 => {
                self.interim_bits(chain, next_height, tip.bits)
            }
            DaaMode::Legacy if next_height % self.params.legacy_interval == 0 => {
                self.legacy_bits(chain, next_height, tip.bits)
            }
            _ => Ok(tip.bits),
        }
    }

    /// Banded adjustment at an interim boundary.
    ///
    /// The measured timespan runs from the header `period` blocks back to
    /// the second-to-last header of the closing period, `period - 2` gaps
    /// in all. The final header is excluded so a miner cannot steer the
    /// adjustment with the timestamp of the boundary block itself.
    fn interim_bits<C: ChainView + ?Sized>(
        &self,
        chain: &C,
        next_height: u32,
        tip_bits: u32,
    ) -> ConsensusResult<u32> {
        let period = self.params.interim_period;
        if next_height < period {
            return Ok(tip_bits);
        }

        let first = expect_header(chain, next_height - period)?;
        let last = expect_header(chain, next_height - 2)?;
        let span = last.time.saturating_sub(first.time);

        let scale = u64::from(period - 2) * self.params.target_spacing_secs;
        let step = band_step(span.saturating_mul(30), scale);

        let bits = clamp_bits(
            i64::from(tip_bits) + step,
            self.params.min_bits,
            self.params.max_bits,
        );
        debug!(
            height = next_height,
            span,
            step,
            old_bits = tip_bits,
            new_bits = bits,
            "Interim difficulty adjustment"
        );
        Ok(bits)
    }

    /// Legacy retarget at a legacy interval boundary.
    ///
    /// Bits moves by twice the base-2 log of the ratio between the target
    /// timespan and the measured one, with the measured timespan clamped
    /// to a factor of four in either direction. The result is rounded to
    /// the nearest integer and then, if odd, raised by one: bits is the
    /// bit length of a semiprime with equal-size factors and must stay
    /// even.
    fn legacy_bits<C: ChainView + ?Sized>(
        &self,
        chain: &C,
        next_height: u32,
        tip_bits: u32,
    ) -> ConsensusResult<u32> {
        let interval = self.params.legacy_interval;
        if next_height < interval {
            return Ok(tip_bits);
        }

        let first = expect_header(chain, next_height - interval)?;
        let last = expect_header(chain, next_height - 2)?;
        let span = last.time.saturating_sub(first.time).max(1);

        let target_span = u64::from(interval - 2) * self.params.target_spacing_secs;
        let clamped = span.clamp(target_span / 4, target_span * 4);

        let shift = 2.0 * (target_span as f64 / clamped as f64).log2();
        let mut adjusted = (f64::from(tip_bits) + shift).round() as i64;
        if adjusted % 2 != 0 {
            adjusted += 1;
        }

        let bits = clamp_bits(adjusted, self.params.min_bits, self.params.max_bits);
        debug!(
            height = next_height,
            span,
            clamped,
            old_bits = tip_bits,
            new_bits = bits,
            "Legacy difficulty adjustment"
        );
        Ok(bits)
    }
}

/// Band lookup over `30 * span` against multiples of the on-target span.
/// Bands are half-open: an average gap exactly on a bound belongs to the
/// slower band, on every bound.
fn band_step(thirtieths: u64, scale: u64) -> i64 {
    for &(bound, step) in &INTERIM_BANDS {
        if thirtieths < bound.saturating_mul(scale) {
            return step;
        }
    }
    INTERIM_FLOOR_STEP
}

fn clamp_bits(bits: i64, min_bits: u32, max_bits: u32) -> u32 {
    bits.clamp(i64::from(min_bits), i64::from(max_bits)) as u32
}

/// Required bits for the block after `tip_height` under `params`.
pub fn next_required_bits<C: ChainView + ?Sized>(
    chain: &C,
    tip_height: u32,
    params: &ChainParams,
) -> ConsensusResult<u32> {
    DifficultyEngine::new(params).next_required_bits(chain, tip_height)
}
