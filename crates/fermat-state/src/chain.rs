//! Best-chain header storage.

use crate::error::{StateError, StateResult};
use fermat_consensus::{ChainParams, ChainView, Header, HeaderValidator};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// The best header chain, indexed by height from genesis.
///
/// Headers are stored contiguously, so height lookups are array index
/// lookups. Writers take the lock only to append or truncate; consensus
/// queries go through the [`ChainView`] impl and take read locks.
pub struct HeaderChain {
    headers: RwLock<Vec<Header>>,
}

impl HeaderChain {
    pub fn new(genesis: Header) -> StateResult<Self> {
        if genesis.height != 0 {
            return Err(StateError::InvalidGenesis(genesis.height));
        }
        Ok(Self {
            headers: RwLock::new(vec![genesis]),
        })
    }

    /// The current tip header.
    pub fn tip(&self) -> Header {
        let headers = self.headers.read();
        headers[headers.len() - 1]
    }

    /// Headers in `from..=to`, clipped to the chain.
    pub fn header_range(&self, from: u32, to: u32) -> Vec<Header> {
        let headers = self.headers.read();
        let end = (to as usize + 1).min(headers.len());
        headers
            .get(from as usize..end)
            .map(<[Header]>::to_vec)
            .unwrap_or_default()
    }

    /// Drop all headers above `height`, making it the new tip.
    pub fn truncate_to(&self, height: u32) -> StateResult<()> {
        let mut headers = self.headers.write();
        let tip = (headers.len() - 1) as u32;
        if height > tip {
            return Err(StateError::TruncateBeyondTip {
                target: height,
                tip,
            });
        }
        headers.truncate(height as usize + 1);
        info!(new_tip = height, "Chain truncated");
        Ok(())
    }

    fn push(&self, header: Header) {
        self.headers.write().push(header);
    }
}

impl ChainView for HeaderChain {
    fn best_height(&self) -> u32 {
        (self.headers.read().len() - 1) as u32
    }

    fn header_at(&self, height: u32) -> Option<Header> {
        self.headers.read().get(height as usize).copied()
    }
}

/// Connects blocks to a [`HeaderChain`] through consensus validation.
pub struct BlockConnector<'a> {
    params: &'a ChainParams,
    chain: &'a HeaderChain,
}

impl<'a> BlockConnector<'a> {
    pub fn new(params: &'a ChainParams, chain: &'a HeaderChain) -> Self {
        Self { params, chain }
    }

    /// Validate `header` against the current tip and append it.
    pub fn connect(&self, header: Header) -> StateResult<()> {
        let validator = HeaderValidator::new(self.params);
        if let Err(e) = validator.check_header(self.chain, &header) {
            warn!(height = header.height, error = %e, "Rejected header");
            return Err(e.into());
        }
        self.chain.push(header);
        debug!(height = header.height, bits = header.bits, "Connected header");
        Ok(())
    }
}
