//! Contextual header validation.

use crate::chain_params::ChainParams;
use crate::difficulty::DifficultyEngine;
use crate::header::{ChainView, Header};
use crate::{ConsensusError, ConsensusResult};
use tracing::debug;

/// Validates headers against the chain they extend.
///
/// A header is checked in context: it must extend the current tip by one,
/// carry a timestamp after its parent's, and declare exactly the bits the
/// difficulty engine requires at its height.
pub struct HeaderValidator<'a> {
    params: &'a ChainParams,
}

impl<'a> HeaderValidator<'a> {
    pub fn new(params: &'a ChainParams) -> Self {
        Self { params }
    }

    pub fn check_header<C: ChainView + ?Sized>(
        &self,
        chain: &C,
        header: &Header,
    ) -> ConsensusResult<()> {
        let tip_height = chain.best_height();
        if header.height != tip_height + 1 {
            return Err(ConsensusError::InvalidHeader(format!(
                "height {} does not extend tip {}",
                header.height, tip_height
            )));
        }

        let parent = chain
            .header_at(tip_height)
            .ok_or(ConsensusError::MissingHeader(tip_height))?;
        if header.time <= parent.time {
            return Err(ConsensusError::InvalidTimestamp {
                block_time: header.time,
                parent_time: parent.time,
            });
        }

        let expected = DifficultyEngine::new(self.params).next_required_bits(chain, tip_height)?;
        if header.bits != expected {
            return Err(ConsensusError::InvalidDifficulty {
                got: header.bits,
                expected,
            });
        }

        debug!(height = header.height, bits = header.bits, "Header valid");
        Ok(())
    }
}
