//! Bee proof assembly
//!
//! Turns a solution into the coinbase of a bee-mined block: output 0 carries the proof script,
//! output 1 pays the block reward to the honey address that owns the bee.

use crate::worker::BeeSolution;
use consensus::consensus::hive::signature::sign_compact;
use consensus::BeeProof;
use consensus_core::script::Script;
use consensus_core::tx::{Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};
use hive_hashes::bee_signature_message;
use secp256k1::{Secp256k1, SecretKey, Signing};

/// Builds the bee proof script for `solution`, signed with the honey key.
///
/// The signature covers the deterministic random string the bee was hashed against.
pub fn build_bee_proof_script<C: Signing>(
    secp: &Secp256k1<C>,
    solution: &BeeSolution,
    deterministic_rand: &str,
    honey_key: &SecretKey,
) -> Script {
    let message = bee_signature_message(deterministic_rand);
    let proof = BeeProof {
        nonce: solution.nonce,
        claimed_height: solution.range.bct_height,
        community_contrib: solution.range.community_contrib,
        txid_hex: solution.range.txid.clone(),
        signature: sign_compact(secp, &message, honey_key, true),
    };
    log::debug!("Bee proof for bee {} of {} signed", solution.nonce, solution.range.txid);
    proof.encode()
}

/// Coinbase of a bee-mined block at `height` paying `reward` to the solution's honey script.
pub fn bee_coinbase(proof_script: Script, solution: &BeeSolution, height: u32, reward: i64) -> Transaction {
    let height_push = Script::new(height.to_le_bytes().to_vec());
    Transaction::new(
        1,
        vec![TransactionInput::new(TransactionOutpoint::null(), height_push, u32::MAX)],
        vec![
            TransactionOutput::new(0, proof_script),
            TransactionOutput::new(reward, solution.range.honey_script.clone()),
        ],
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::BeeRange;
    use consensus::consensus::hive::signature::{key_id, recover_key_id};
    use consensus_core::script::KeyId;
    use consensus_core::Hash;
    use secp256k1::PublicKey;

    fn solution(community_contrib: bool) -> BeeSolution {
        BeeSolution {
            range: BeeRange {
                txid: Hash::from_bytes([0x5a; 32]).to_hex(),
                bct_height: 1234,
                honey_script: Script::p2pkh(&KeyId([0x11; 20])),
                community_contrib,
                offset: 100,
                count: 50,
            },
            nonce: 120,
            bee_hash: Hash::zeroed(),
            worker_id: 0,
        }
    }

    #[test]
    fn test_proof_script_decodes() {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let script = build_bee_proof_script(&secp, &solution(true), "cafe", &key);

        let proof = BeeProof::decode(&script).unwrap();
        assert_eq!(proof.nonce, 120);
        assert_eq!(proof.claimed_height, 1234);
        assert!(proof.community_contrib);
        assert_eq!(proof.txid(), Hash::from_bytes([0x5a; 32]));

        let signer = recover_key_id(&secp, &bee_signature_message("cafe"), &proof.signature);
        assert_eq!(signer, Some(key_id(&PublicKey::from_secret_key(&secp, &key), true)));
    }

    #[test]
    fn test_donation_flag_is_op_false_when_unset() {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let script = build_bee_proof_script(&secp, &solution(false), "cafe", &key);
        assert_eq!(script.as_bytes()[12], 0x00);
        assert!(!BeeProof::decode(&script).unwrap().community_contrib);
    }

    #[test]
    fn test_bee_coinbase_layout() {
        let sol = solution(false);
        let coinbase = bee_coinbase(Script::new(vec![0x6a]), &sol, 7, 5_000);
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.outputs.len(), 2);
        assert_eq!(coinbase.outputs[0].value, 0);
        assert_eq!(coinbase.outputs[1].script_public_key, sol.range.honey_script);
        assert_eq!(coinbase.outputs[1].value, 5_000);
    }
}
