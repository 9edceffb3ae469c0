//! Test harness for driving a regtest chain.

use fermat_consensus::{
    deployment_info, deployment_status, next_required_bits, ChainParams, ChainView,
    DeploymentInfo, DeploymentStatus, Header, VERSIONBITS_TOP_BITS,
};
use fermat_state::{BlockConnector, HeaderChain};

/// Version that signals readiness for the interim deployment.
pub const SIGNAL_VERSION: u32 = VERSIONBITS_TOP_BITS | (1 << 25);

/// Version with the top marker but no deployment bits.
pub const PLAIN_VERSION: u32 = VERSIONBITS_TOP_BITS;

/// Genesis difficulty used by the regtest harness.
pub const GENESIS_BITS: u32 = 64;

const GENESIS_TIME: u64 = 1_600_000_000;

/// A regtest chain mined through the real block connector.
pub struct TestChain {
    pub params: ChainParams,
    pub chain: HeaderChain,
}

impl TestChain {
    pub fn regtest() -> Self {
        Self::with_params(ChainParams::regtest())
    }

    pub fn with_params(params: ChainParams) -> Self {
        let genesis = Header {
            height: 0,
            time: GENESIS_TIME,
            version: PLAIN_VERSION,
            bits: GENESIS_BITS,
        };
        let chain = HeaderChain::new(genesis).expect("genesis at height 0");
        Self { params, chain }
    }

    pub fn tip(&self) -> Header {
        self.chain.tip()
    }

    pub fn height(&self) -> u32 {
        self.chain.best_height()
    }

    /// Bits required of the next block.
    pub fn next_bits(&self) -> u32 {
        next_required_bits(&self.chain, self.height(), &self.params)
            .expect("tip is always a known height")
    }

    /// Deployment state at the current tip.
    pub fn status(&self) -> DeploymentStatus {
        deployment_status(&self.chain, self.height(), &self.params.interim_daa)
            .expect("tip is always a known height")
    }

    /// Deployment status report at the current tip.
    pub fn info(&self) -> DeploymentInfo {
        deployment_info(&self.chain, self.height(), &self.params.interim_daa)
            .expect("tip is always a known height")
    }

    /// Mine one block with an explicit timestamp.
    pub fn mine_at(&self, version: u32, time: u64) {
        let tip = self.tip();
        let header = Header {
            height: tip.height + 1,
            time,
            version,
            bits: self.next_bits(),
        };
        BlockConnector::new(&self.params, &self.chain)
            .connect(header)
            .expect("harness blocks carry the required bits");
    }

    /// Mine `count` blocks at a fixed spacing.
    pub fn mine(&self, count: u32, version: u32, spacing: u64) {
        for _ in 0..count {
            self.mine_at(version, self.tip().time + spacing);
        }
    }

    /// Drive the interim deployment to activation at height 168.
    ///
    /// Window 1 falls one signal short, window 2 meets the threshold
    /// exactly, so the walk covers STARTED, LOCKED_IN and ACTIVE. Blocks
    /// are one second apart, leaving the first interim adjustment at
    /// height 168 deep in the fastest band.
    pub fn activate_interim(&self) {
        assert_eq!(self.height(), 0, "activation starts from genesis");
        self.mine(41, PLAIN_VERSION, 1);
        self.mine(39, SIGNAL_VERSION, 1);
        self.mine(3, PLAIN_VERSION, 1);
        self.mine(40, SIGNAL_VERSION, 1);
        self.mine(2, PLAIN_VERSION, 1);
        self.mine(42, PLAIN_VERSION, 1);
    }

    /// Mine blocks until the tip reaches `height`.
    pub fn mine_to(&self, height: u32, version: u32, spacing: u64) {
        assert!(height >= self.height(), "chain is already past {height}");
        self.mine(height - self.height(), version, spacing);
    }
}
