//! Regtest chain builder shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use consensus::{
    check_proof_of_work, deterministic_rand_string, BeeProof, BeeProofSummary, BlockProcessingResult, BlockProcessor,
    BlockSource, CoinView, DifficultyManager, HiveProofError, HiveProofValidator, MemoryBlockStore, MemoryUtxoSet, ProofPath,
};
use consensus::consensus::hive::signature::{key_id, sign_compact};
use consensus_core::block::Block;
use consensus_core::header::BlockHeader;
use consensus_core::script::{KeyId, Script};
use consensus_core::subsidy::{bee_cost, block_subsidy};
use consensus_core::tx::{Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};
use consensus_core::{ConsensusParams, Hash};
use consensus_pow::PowEngine;
use hive_hashes::{bee_signature_message, BeeHashBuilder};
use hive_math::target_from_bits;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};

pub const GENESIS_TIME: u32 = 1_600_000_000;
pub const SPACING: u32 = 150;

pub struct Honey {
    pub secret: SecretKey,
    pub key_id: KeyId,
}

impl Honey {
    pub fn new(secp: &Secp256k1<All>, seed: u8) -> Self {
        let secret = SecretKey::from_slice(&[seed; 32]).expect("valid secret key");
        let key_id = key_id(&PublicKey::from_secret_key(secp, &secret), true);
        Self { secret, key_id }
    }

    pub fn script(&self) -> Script {
        Script::p2pkh(&self.key_id)
    }
}

/// What goes into a bee proof. Defaults describe a valid proof once the nonce is found.
#[derive(Clone)]
pub struct BeeClaim {
    pub txid: Hash,
    pub claimed_height: u32,
    pub nonce: u32,
    pub community_contrib: bool,
}

pub struct Harness {
    pub params: Arc<ConsensusParams>,
    pub store: Arc<MemoryBlockStore>,
    pub utxos: Arc<MemoryUtxoSet>,
    pub processor: BlockProcessor,
    pub secp: Secp256k1<All>,
    pub use_coin_view: bool,
    salt: u32,
}

impl Harness {
    pub fn new(params: ConsensusParams, use_coin_view: bool) -> Self {
        Self::with_engine(params, use_coin_view, PowEngine::new())
    }

    pub fn with_engine(params: ConsensusParams, use_coin_view: bool, engine: PowEngine) -> Self {
        let params = Arc::new(params);
        let store = Arc::new(MemoryBlockStore::new());
        let utxos = Arc::new(MemoryUtxoSet::new());
        let genesis_coinbase = coinbase_tx(0, 0, vec![TransactionOutput::new(0, Script::new(vec![0x51]))]);
        let mut genesis = Block::new(
            BlockHeader { version: 1, time: GENESIS_TIME, bits: 0x207f_ffff, ..Default::default() },
            vec![genesis_coinbase],
        );
        genesis.header.merkle_root = genesis.calculate_merkle_root();
        utxos.connect_block(&genesis, 0);

        let mut processor = BlockProcessor::new(params.clone(), genesis, store.clone(), engine).unwrap();
        if use_coin_view {
            processor = processor.with_coin_view(utxos.clone());
        }
        Self { params, store, utxos, processor, secp: Secp256k1::new(), use_coin_view, salt: 0 }
    }

    pub fn regtest() -> Self {
        Self::new(ConsensusParams::regtest(), false)
    }

    pub fn tip(&self) -> (Hash, u32, u32) {
        let state = self.processor.state();
        let state = state.read();
        let node = state.tip_node();
        (node.hash, node.height, node.time())
    }

    pub fn height(&self) -> u32 {
        self.tip().1
    }

    /// Hash of the active chain block at `height`.
    pub fn block_hash_at(&self, height: u32) -> Hash {
        let state = self.processor.state();
        let state = state.read();
        let id = state.active().at(height).expect("height on the active chain");
        state.index().node(id).hash
    }

    fn next_salt(&mut self) -> u32 {
        self.salt += 1;
        self.salt
    }

    /// Builds a valid PoW block on the tip without processing it.
    pub fn build_pow(&mut self, txs: Vec<Transaction>) -> Block {
        let tip = self.tip().0;
        self.build_pow_on(tip, txs)
    }

    /// Builds a valid PoW block on `prev`, which need not be the tip.
    pub fn build_pow_on(&mut self, prev: Hash, txs: Vec<Transaction>) -> Block {
        let (height, time, bits) = {
            let state = self.processor.state();
            let state = state.read();
            let parent = state.index().get(&prev).expect("parent in the block index");
            let node = state.index().node(parent);
            let time = node.time() + SPACING;
            let bits = DifficultyManager::new(&self.params).next_work_required(state.index(), parent, i64::from(time));
            (node.height + 1, time, bits)
        };
        let salt = self.next_salt();
        let reward = TransactionOutput::new(block_subsidy(height, &self.params), Script::p2pkh(&KeyId([0x11; 20])));
        let mut transactions = vec![coinbase_tx(height, salt, vec![reward])];
        transactions.extend(txs);

        let mut block = Block::new(
            BlockHeader { version: 0x2000_0000, prev_block_hash: prev, time, bits, ..Default::default() },
            transactions,
        );
        block.header.merkle_root = block.calculate_merkle_root();
        grind(&mut block.header, &self.params);
        block
    }

    /// Processes `block`, which must be accepted, and applies it to the UTXO set.
    pub fn accept(&mut self, block: Block) -> BlockProcessingResult {
        let height = self.height() + 1;
        let result = self.processor.process_block(block.clone()).unwrap();
        assert!(result.is_valid(), "block rejected: {:?}", result);
        self.utxos.connect_block(&block, height);
        result
    }

    pub fn mine_pow(&mut self, txs: Vec<Transaction>) -> Block {
        let block = self.build_pow(txs);
        self.accept(block.clone());
        block
    }

    pub fn mine_pow_to(&mut self, height: u32) {
        while self.height() < height {
            self.mine_pow(vec![]);
        }
    }

    /// A bee creation transaction paying `value` for bees, plus `donation` to the community fund.
    pub fn bee_creation(&mut self, honey: &Honey, value: i64, donation: Option<i64>) -> Transaction {
        let salt = self.next_salt();
        let mut funding = [0u8; 32];
        funding[..4].copy_from_slice(&salt.to_le_bytes());
        let mut outputs = vec![TransactionOutput::new(value, Script::bee_creation(&self.params.bee_creation_script, &honey.script()))];
        if let Some(donation) = donation {
            outputs.push(TransactionOutput::new(donation, self.params.community_script.clone()));
        }
        Transaction::new(
            1,
            vec![TransactionInput::new(TransactionOutpoint::new(Hash::from_bytes(funding), 0), Script::default(), u32::MAX)],
            outputs,
            0,
        )
    }

    /// Cost of one bee bought at `height`.
    pub fn bee_cost(&self, height: u32) -> i64 {
        bee_cost(height, &self.params)
    }

    /// Whether bee `nonce` of `txid` meets the bee target on the current tip.
    pub fn bee_meets_target(&self, txid: &Hash, nonce: u32) -> bool {
        let state = self.processor.state();
        let state = state.read();
        let det_rand = deterministic_rand_string(state.index(), state.tip());
        let target = target_from_bits(state.next_required_target(ProofPath::Hive, 0));
        let hash = BeeHashBuilder::new(&det_rand, &txid.to_hex()).finalize_with_nonce(nonce);
        consensus::consensus::validation::hash_to_u256(&hash) < target
    }

    /// First bee of `txid` below `bee_count` that meets the bee target on the current tip.
    pub fn find_bee(&self, txid: &Hash, bee_count: u32) -> Option<u32> {
        (0..bee_count).find(|nonce| self.bee_meets_target(txid, *nonce))
    }

    /// Builds a bee-mined block on the tip proving `claim`, signed by `signer` and paying `honey`.
    pub fn build_bee(&mut self, claim: &BeeClaim, honey: &Honey, signer: &Honey) -> Block {
        let (prev, height, time) = self.tip();
        let height = height + 1;
        let state = self.processor.state();
        let (det_rand, bits) = {
            let state = state.read();
            (deterministic_rand_string(state.index(), state.tip()), state.next_required_target(ProofPath::Hive, 0))
        };
        let message = bee_signature_message(&det_rand);
        let proof = BeeProof {
            nonce: claim.nonce,
            claimed_height: claim.claimed_height,
            community_contrib: claim.community_contrib,
            txid_hex: claim.txid.to_hex(),
            signature: sign_compact(&self.secp, &message, &signer.secret, true),
        };
        let salt = self.next_salt();
        let outputs = vec![
            TransactionOutput::new(0, proof.encode()),
            TransactionOutput::new(block_subsidy(height, &self.params), honey.script()),
        ];
        let mut block = Block::new(
            BlockHeader {
                version: 0x2000_0000,
                prev_block_hash: prev,
                time: time + SPACING,
                bits,
                nonce: self.params.hive_nonce_marker,
                ..Default::default()
            },
            vec![coinbase_tx(height, salt, outputs)],
        );
        block.header.merkle_root = block.calculate_merkle_root();
        block
    }

    /// Runs the bee proof checks on `block` against the current chain state.
    pub fn check_bee(&self, block: &Block) -> Result<BeeProofSummary, HiveProofError> {
        let blocks: Arc<dyn BlockSource> = self.store.clone();
        let mut validator = HiveProofValidator::new(self.params.clone(), blocks);
        if self.use_coin_view {
            let coins: Arc<dyn CoinView> = self.utxos.clone();
            validator = validator.with_coin_view(coins);
        }
        let state = self.processor.state();
        let state = state.read();
        validator.check_hive_proof(state.index(), block)
    }
}

/// Searches for a nonce meeting the header's own bits, skipping the bee block marker.
pub fn grind(header: &mut BlockHeader, params: &ConsensusParams) {
    for nonce in 0.. {
        if nonce == params.hive_nonce_marker {
            continue;
        }
        header.nonce = nonce;
        if check_proof_of_work(&header.hash(), header.bits, params).is_ok() {
            return;
        }
    }
}

pub fn coinbase_tx(height: u32, salt: u32, outputs: Vec<TransactionOutput>) -> Transaction {
    let mut script = height.to_le_bytes().to_vec();
    script.extend_from_slice(&salt.to_le_bytes());
    Transaction::new(1, vec![TransactionInput::new(TransactionOutpoint::null(), Script::new(script), u32::MAX)], outputs, 0)
}
