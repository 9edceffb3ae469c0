//! Property-based tests over randomized mining schedules.
//!
//! Parameters are shrunk (6-block windows, 18-block activity) so a few
//! dozen random blocks can exercise every state and both algorithms.

use crate::harness::{TestChain, PLAIN_VERSION, SIGNAL_VERSION};
use fermat_consensus::{
    ActivationPoint, ChainParams, ChainView, DaaMode, DeploymentParams, DifficultyEngine,
    ThresholdState,
};
use proptest::prelude::*;

fn tiny_params() -> ChainParams {
    let mut params = ChainParams::regtest();
    params.interim_period = 6;
    params.legacy_interval = 12;
    params.interim_daa = DeploymentParams {
        name: "interim_daa",
        bit: 25,
        window: 6,
        threshold: 5,
        start: ActivationPoint::Height(0),
        timeout: None,
        max_active_blocks: Some(18),
    };
    params.validate().expect("tiny params are well-formed");
    params
}

fn schedule() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 1u64..4000), 1..80)
}

fn mine_schedule(chain: &TestChain, blocks: &[(bool, u64)]) {
    for &(signal, spacing) in blocks {
        let version = if signal { SIGNAL_VERSION } else { PLAIN_VERSION };
        chain.mine(1, version, spacing);
    }
}

proptest! {
    /// Bits stays even and inside the configured range on every block.
    #[test]
    fn prop_bits_even_and_bounded(blocks in schedule()) {
        let chain = TestChain::with_params(tiny_params());
        mine_schedule(&chain, &blocks);
        for height in 0..=chain.height() {
            let header = chain.chain.header_at(height).unwrap();
            prop_assert_eq!(header.bits % 2, 0);
            prop_assert!(header.bits >= chain.params.min_bits);
            prop_assert!(header.bits <= chain.params.max_bits);
        }
    }

    /// The deployment state never moves backwards along a chain, and the
    /// activation height never changes once set.
    #[test]
    fn prop_state_monotone(blocks in schedule()) {
        let chain = TestChain::with_params(tiny_params());
        let mut previous = ThresholdState::Defined;
        let mut active_since = None;
        for &(signal, spacing) in &blocks {
            let version = if signal { SIGNAL_VERSION } else { PLAIN_VERSION };
            chain.mine(1, version, spacing);
            let status = chain.status();
            prop_assert!(status.state >= previous);
            previous = status.state;
            if status.is_active() {
                let since = *active_since.get_or_insert(status.since);
                prop_assert_eq!(status.since, since);
            }
        }
    }

    /// The same schedule always produces the same chain.
    #[test]
    fn prop_deterministic(blocks in schedule()) {
        let a = TestChain::with_params(tiny_params());
        let b = TestChain::with_params(tiny_params());
        mine_schedule(&a, &blocks);
        mine_schedule(&b, &blocks);
        prop_assert_eq!(a.tip(), b.tip());
        prop_assert_eq!(a.status(), b.status());
    }

    /// Once the activity window has elapsed, the effective algorithm is
    /// legacy at every later tip.
    #[test]
    fn prop_interim_never_outlives_window(blocks in schedule()) {
        let chain = TestChain::with_params(tiny_params());
        mine_schedule(&chain, &blocks);
        let engine = DifficultyEngine::new(&chain.params);
        let status = chain.status();
        if !status.is_active() {
            return Ok(());
        }
        let expiry = status.since + 18;
        for tip in status.since..=chain.height() {
            let mode = engine.effective_algorithm(&chain.chain, tip).unwrap();
            if tip + 1 >= expiry {
                prop_assert_eq!(mode, DaaMode::Legacy);
            }
        }
    }
}
