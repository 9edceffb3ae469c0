//! Banded interim adjustment scenarios on regtest.

use crate::harness::{TestChain, GENESIS_BITS, PLAIN_VERSION};
use fermat_consensus::{DaaMode, DifficultyEngine};

#[test]
fn test_no_adjustment_before_activation() {
    let chain = TestChain::regtest();
    // Fast blocks across three interim boundaries while the deployment
    // is not yet active: bits never moves.
    chain.mine(130, PLAIN_VERSION, 1);
    assert_eq!(chain.tip().bits, GENESIS_BITS);
    assert_eq!(chain.next_bits(), GENESIS_BITS);

    let engine = DifficultyEngine::new(&chain.params);
    assert_eq!(
        engine.effective_algorithm(&chain.chain, chain.height()).unwrap(),
        DaaMode::Legacy
    );
}

#[test]
fn test_first_adjustment_at_activation_boundary() {
    let chain = TestChain::regtest();
    chain.activate_interim();
    assert_eq!(chain.height(), 167);
    assert_eq!(chain.tip().bits, GENESIS_BITS);

    // One-second blocks put the closing window in the fastest band.
    assert_eq!(chain.next_bits(), GENESIS_BITS + 6);
}

#[test]
fn test_band_walk_returns_to_start() {
    let chain = TestChain::regtest();
    chain.activate_interim();

    // Each phase mines one full period at a fixed spacing and checks the
    // step taken at the next boundary. The deltas cancel out, landing
    // back on 70 for height 462.
    let mut bits = 70i64;
    for (spacing, delta) in [
        (1800u64, 0i64),
        (1619, 2),
        (1861, -2),
        (1199, 4),
        (2701, -4),
        (899, 6),
        (3601, -6),
    ] {
        chain.mine(42, PLAIN_VERSION, spacing);
        bits += delta;
        assert_eq!(
            i64::from(chain.next_bits()),
            bits,
            "unexpected step after spacing {spacing}"
        );
    }
    assert_eq!(chain.height(), 461);
    assert_eq!(chain.next_bits(), 70);
}

#[test]
fn test_on_target_spacing_holds_bits() {
    let chain = TestChain::regtest();
    chain.activate_interim();
    chain.mine(1, PLAIN_VERSION, 1);

    // Target-spaced blocks across many boundaries: step zero every time.
    chain.mine(420, PLAIN_VERSION, 1800);
    assert_eq!(chain.tip().bits, 70);
    assert_eq!(chain.next_bits(), 70);
}

#[test]
fn test_off_boundary_heights_carry_bits() {
    let chain = TestChain::regtest();
    chain.activate_interim();
    chain.mine(1, PLAIN_VERSION, 1);

    // Very fast blocks, but between boundaries bits cannot move.
    for _ in 0..41 {
        let before = chain.next_bits();
        chain.mine(1, PLAIN_VERSION, 1);
        assert_eq!(chain.tip().bits, before);
    }
}
