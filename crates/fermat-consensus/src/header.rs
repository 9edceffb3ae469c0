//! Header data and the read-only chain view consumed by consensus rules.

use crate::{ConsensusError, ConsensusResult};

/// The header fields consensus rules need.
///
/// `bits` is the difficulty encoding: the bit length of the factoring
/// target for this block's proof of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Block height. Genesis is height 0.
    pub height: u32,
    /// Block timestamp in unix seconds.
    pub time: u64,
    /// Block version. The top three bits carry the versionbits marker,
    /// the low bits are the deployment signaling field.
    pub version: u32,
    /// Required difficulty encoding.
    pub bits: u32,
}

/// Read-only access to the currently-active chain's header sequence.
///
/// Implementations must present a stable snapshot for the duration of a
/// consensus query; serializing writers against readers is the owner's
/// responsibility. On a single active chain, `header_at(h)` is the
/// ancestor-at-height lookup from any tip.
pub trait ChainView {
    /// Height of the best (tip) header.
    fn best_height(&self) -> u32;

    /// Header at the given height on the active chain, if connected.
    fn header_at(&self, height: u32) -> Option<Header>;
}

/// Fetch a header that chain consistency says must exist.
pub(crate) fn expect_header<C: ChainView + ?Sized>(
    chain: &C,
    height: u32,
) -> ConsensusResult<Header> {
    chain
        .header_at(height)
        .ok_or(ConsensusError::MissingHeader(height))
}

/// Reject tips the chain view does not hold.
pub(crate) fn check_tip<C: ChainView + ?Sized>(chain: &C, tip_height: u32) -> ConsensusResult<()> {
    let best = chain.best_height();
    if tip_height > best {
        return Err(ConsensusError::UnknownHeight {
            height: tip_height,
            tip: best,
        });
    }
    Ok(())
}
