mod common;

use common::{BeeClaim, Harness, Honey};
use consensus::consensus::hive::proof::BeeProofDecodeError;
use consensus::{BlockStatus, HiveProofError, StorageError};
use consensus_core::config::NEVER;
use consensus_core::script::Script;
use consensus_core::tx::{Transaction, TransactionOutput};
use consensus_core::ConsensusParams;

/// Puts `bct` in a PoW block at height 3 and mines PoW blocks until the tip is at `tip`.
fn fund(harness: &mut Harness, bct: &Transaction, tip: u32) -> u32 {
    harness.mine_pow_to(2);
    harness.mine_pow(vec![bct.clone()]);
    harness.mine_pow_to(tip);
    3
}

fn claim_first_bee(harness: &Harness, bct: &Transaction, bee_count: u32, height: u32) -> BeeClaim {
    let txid = bct.id();
    let nonce = harness.find_bee(&txid, bee_count).expect("a bee meeting the target");
    BeeClaim { txid, claimed_height: height, nonce, community_contrib: false }
}

#[test]
fn test_valid_bee_block_extends_chain() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    let claim = claim_first_bee(&harness, &bct, 100, height);
    let block = harness.build_bee(&claim, &honey, &honey);
    let summary = harness.check_bee(&block).unwrap();
    assert_eq!(summary.height, 13);
    assert_eq!(summary.bct_height, 3);
    assert_eq!(summary.bee_count, 100);
    assert_eq!(summary.honey_key_id, honey.key_id);
    assert!(summary.deep_drill);

    let work_before = {
        let state = harness.processor.state();
        let state = state.read();
        state.tip_node().chain_work
    };
    let result = harness.accept(block.clone());
    assert!(result.tip_changed);
    assert_eq!(result.height, Some(13));
    let state = harness.processor.state();
    let state = state.read();
    assert_eq!(state.tip_node().hash, block.hash());
    assert!(state.tip_node().chain_work > work_before);
}

#[test]
fn test_bee_nonce_must_be_below_bee_count() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bcts: Vec<_> = (0..64).map(|_| harness.bee_creation(&honey, 5 * cost, None)).collect();
    harness.mine_pow_to(2);
    harness.mine_pow(bcts.clone());
    harness.mine_pow_to(12);

    // Bees 4 and 5 both need to meet the target so only the bee count decides.
    let bct = bcts
        .iter()
        .find(|bct| harness.bee_meets_target(&bct.id(), 4) && harness.bee_meets_target(&bct.id(), 5))
        .expect("a bee creation transaction whose bees 4 and 5 meet the target");

    let last = BeeClaim { txid: bct.id(), claimed_height: 3, nonce: 4, community_contrib: false };
    let block = harness.build_bee(&last, &honey, &honey);
    assert_eq!(harness.check_bee(&block).unwrap().bee_count, 5);

    let beyond = BeeClaim { nonce: 5, ..last };
    let block = harness.build_bee(&beyond, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::NonceOutOfRange { nonce: 5, bee_count: 5 }));
}

#[test]
fn test_bee_hash_above_target() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    let txid = bct.id();
    let nonce = (0..100).find(|n| !harness.bee_meets_target(&txid, *n)).expect("a bee missing the target");
    let block = harness.build_bee(&BeeClaim { txid, claimed_height: height, nonce, community_contrib: false }, &honey, &honey);
    assert!(matches!(harness.check_bee(&block), Err(HiveProofError::BeeHashAboveTarget(_))));

    let result = harness.processor.process_block(block).unwrap();
    assert_eq!(result.status, BlockStatus::Invalid);
    assert_eq!(result.reject_reason, Some("hive-high-hash"));
}

#[test]
fn test_maturity_window() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 11);

    // Next block at 12 is only 9 blocks deep.
    let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::Immature(9)));

    // Depth 110 is the last height the bee can mine.
    harness.mine_pow_to(112);
    let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    assert!(harness.check_bee(&block).is_ok());

    harness.mine_pow(vec![]);
    let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::Expired(111)));
}

#[test]
fn test_consecutive_bee_blocks_before_hive_1_1() {
    let mut params = ConsensusParams::regtest();
    params.hive_1_1_height = NEVER;
    let mut harness = Harness::new(params, false);
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    harness.accept(block);

    let claim = BeeClaim { txid: bct.id(), claimed_height: height, nonce: 0, community_contrib: false };
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::ConsecutiveBeeBlock));
}

#[test]
fn test_too_many_consecutive_bee_blocks() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    for _ in 0..2 {
        let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
        harness.accept(block);
    }

    let claim = BeeClaim { txid: bct.id(), claimed_height: height, nonce: 0, community_contrib: false };
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::TooManyConsecutiveBeeBlocks { count: 2, max: 2 }));

    let result = harness.processor.process_block(block).unwrap();
    assert_eq!(result.reject_reason, Some("hive-too-many-consecutive"));

    // A PoW block resets the run.
    harness.mine_pow(vec![]);
    let block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    assert!(harness.check_bee(&block).is_ok());
}

#[test]
fn test_signature_must_match_honey_address() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let stranger = Honey::new(&harness.secp, 2);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);
    let claim = claim_first_bee(&harness, &bct, 100, height);

    let block = harness.build_bee(&claim, &honey, &stranger);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::SignatureMismatch));

    // Signed and paid to someone who does not own the bees.
    let block = harness.build_bee(&claim, &stranger, &stranger);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::HoneyAddressMismatch));
}

#[test]
fn test_honey_output_must_be_p2pkh() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    let mut block = harness.build_bee(&claim_first_bee(&harness, &bct, 100, height), &honey, &honey);
    block.transactions[0].outputs[1].script_public_key = Script::new(vec![0x51]);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::BadHoneyAddress));
}

#[test]
fn test_bee_creation_lookup_without_coin_view() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    // Claimed at the wrong height, the deep drill reads a block without the transaction.
    let mut claim = claim_first_bee(&harness, &bct, 100, height);
    claim.claimed_height = 4;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::BeeCreationNotFound(bct.id())));

    claim.claimed_height = 40;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::BeeCreationNotFound(bct.id())));

    let bct_block = harness.block_hash_at(3);
    harness.store.prune(&bct_block).unwrap();
    claim.claimed_height = height;
    let block = harness.build_bee(&claim, &honey, &honey);
    let err = harness.check_bee(&block).unwrap_err();
    assert_eq!(err, HiveProofError::BeeCreationUnavailable { txid: bct.id(), source: StorageError::Pruned(bct_block) });
    assert!(err.is_unavailable());
}

#[test]
fn test_bee_creation_lookup_with_coin_view() {
    let mut harness = Harness::new(ConsensusParams::regtest(), true);
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);

    let bct_block = harness.block_hash_at(3);
    harness.store.prune(&bct_block).unwrap();

    let mut claim = claim_first_bee(&harness, &bct, 100, height);
    let block = harness.build_bee(&claim, &honey, &honey);
    let summary = harness.check_bee(&block).unwrap();
    assert!(!summary.deep_drill);
    assert_eq!(summary.bct_height, 3);

    claim.claimed_height = 4;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::HeightMismatch { claimed: 4, found: 3 }));
}

#[test]
fn test_community_contribution() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let donating = harness.bee_creation(&honey, 180 * cost, Some(20 * cost));
    let short = harness.bee_creation(&honey, 180 * cost, Some(10 * cost));
    let plain = harness.bee_creation(&honey, 200 * cost, None);
    harness.mine_pow_to(2);
    harness.mine_pow(vec![donating.clone(), short.clone(), plain.clone()]);
    harness.mine_pow_to(12);

    let mut claim = claim_first_bee(&harness, &donating, 200, 3);
    claim.community_contrib = true;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block).unwrap().bee_count, 200);

    let mut claim = claim_first_bee(&harness, &short, 190, 3);
    claim.community_contrib = true;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(
        harness.check_bee(&block),
        Err(HiveProofError::BadCommunityContribution { expected: 19 * cost, found: 10 * cost })
    );

    let mut claim = claim_first_bee(&harness, &plain, 200, 3);
    claim.community_contrib = true;
    let block = harness.build_bee(&claim, &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::MissingCommunityContribution));
}

#[test]
fn test_bee_creation_value_floor() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let min_bee_cost = harness.params.min_bee_cost;
    let tiny = harness.bee_creation(&honey, min_bee_cost - 1, None);
    let cheap = harness.bee_creation(&honey, cost - 1, None);
    harness.mine_pow_to(2);
    harness.mine_pow(vec![tiny.clone(), cheap.clone()]);
    harness.mine_pow_to(12);

    let block = harness.build_bee(&claim_first_bee(&harness, &tiny, 100, 3), &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::BelowMinBeeCost(min_bee_cost - 1)));

    let block = harness.build_bee(&claim_first_bee(&harness, &cheap, 100, 3), &honey, &honey);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::BelowBeeCost { value: cost - 1, bee_cost: cost }));
}

#[test]
fn test_coinbase_shape() {
    let mut harness = Harness::regtest();
    let honey = Honey::new(&harness.secp, 1);
    let cost = harness.bee_cost(3);
    let bct = harness.bee_creation(&honey, 100 * cost, None);
    let height = fund(&mut harness, &bct, 12);
    let claim = claim_first_bee(&harness, &bct, 100, height);

    let mut block = harness.build_bee(&claim, &honey, &honey);
    block.transactions[0].outputs.push(TransactionOutput::new(0, Script::new(vec![0x51])));
    assert!(harness.check_bee(&block).is_ok());
    block.transactions[0].outputs.push(TransactionOutput::new(0, Script::new(vec![0x51])));
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::CoinbaseOutputCount(4)));

    let mut block = harness.build_bee(&claim, &honey, &honey);
    block.transactions[0].outputs[0].script_public_key = Script::new(vec![0x6a, 0xb9, 0x04]);
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::MalformedProof(BeeProofDecodeError::TooShort(3))));

    let mut block = harness.build_bee(&claim, &honey, &honey);
    let extra = harness.bee_creation(&honey, 100 * cost, None);
    block.transactions.push(extra);
    block.header.merkle_root = block.calculate_merkle_root();
    assert_eq!(harness.check_bee(&block), Err(HiveProofError::ContainsBeeCreation));
}
