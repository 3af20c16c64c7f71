//! Base58check pay-to-pubkey-hash addresses.

use std::fmt;
use std::str::FromStr;

use hive_hashes::{double_sha256, hash160};

use crate::errors::{ConsensusError, ConsensusResult};
use crate::script::{KeyId, Script};

const CHECKSUM_LEN: usize = 4;
const PAYLOAD_LEN: usize = 1 + 20;

/// A version byte followed by a key hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub version: u8,
    pub key_id: KeyId,
}

impl Address {
    pub fn new(version: u8, key_id: KeyId) -> Self {
        Self { version, key_id }
    }

    /// Address of a serialized (compressed or uncompressed) public key.
    pub fn from_public_key(version: u8, public_key: &[u8]) -> Self {
        Self { version, key_id: KeyId(hash160(public_key)) }
    }

    /// Decodes and checks the network version byte.
    pub fn decode_for(s: &str, version: u8) -> ConsensusResult<Self> {
        let address: Address = s.parse()?;
        if address.version != version {
            return Err(ConsensusError::WrongAddressVersion { expected: version, found: address.version });
        }
        Ok(address)
    }

    /// The pay-to-pubkey-hash script paying this address.
    pub fn script(&self) -> Script {
        Script::p2pkh(&self.key_id)
    }

    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(PAYLOAD_LEN + CHECKSUM_LEN);
        payload.push(self.version);
        payload.extend_from_slice(&self.key_id.0);
        let checksum = double_sha256(&payload);
        payload.extend_from_slice(&checksum.as_bytes()[..CHECKSUM_LEN]);
        bs58::encode(payload).into_string()
    }
}

impl FromStr for Address {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s).into_vec().map_err(|e| ConsensusError::InvalidBase58(e.to_string()))?;
        if decoded.len() != PAYLOAD_LEN + CHECKSUM_LEN {
            return Err(ConsensusError::InvalidAddressLength(decoded.len()));
        }
        let (payload, checksum) = decoded.split_at(PAYLOAD_LEN);
        if &double_sha256(payload).as_bytes()[..CHECKSUM_LEN] != checksum {
            return Err(ConsensusError::InvalidAddressChecksum);
        }
        let mut key_id = [0u8; 20];
        key_id.copy_from_slice(&payload[1..]);
        Ok(Self { version: payload[0], key_id: KeyId(key_id) })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let address = Address::new(28, KeyId([0x42; 20]));
        let encoded = address.encode();
        assert!(encoded.starts_with('C'));
        assert_eq!(encoded.parse::<Address>().unwrap(), address);
        assert_eq!(Address::decode_for(&encoded, 28).unwrap(), address);
        assert_eq!(
            Address::decode_for(&encoded, 127),
            Err(ConsensusError::WrongAddressVersion { expected: 127, found: 28 })
        );
    }

    #[test]
    fn published_addresses_decode() {
        let bcf: Address = "CReateLitecoinCashWorkerBeeXYs19YQ".parse().unwrap();
        assert_eq!(bcf.version, 28);
        assert_eq!(bcf.encode(), "CReateLitecoinCashWorkerBeeXYs19YQ");
        let testnet: Address = "tEstNetCreateLCCWorkerBeeXXXYq6T3r".parse().unwrap();
        assert_eq!(testnet.version, 127);
    }

    #[test]
    fn bad_checksum() {
        let mut encoded = Address::new(28, KeyId([1; 20])).encode();
        let last = encoded.pop().unwrap();
        encoded.push(if last == '2' { '3' } else { '2' });
        assert!(matches!(
            encoded.parse::<Address>(),
            Err(ConsensusError::InvalidAddressChecksum) | Err(ConsensusError::InvalidAddressLength(_))
        ));
        assert!(matches!("0OIl".parse::<Address>(), Err(ConsensusError::InvalidBase58(_))));
    }
}
