//! Consensus constants that do not vary between networks.

/// Base units per coin.
pub const COIN: i64 = 10_000_000;

/// Scale applied to the legacy reward schedule.
pub const COIN_SCALE: i64 = 10;

/// Serialized size of a block header in bytes.
pub const HEADER_SIZE: usize = 80;

/// Version field prefix of headers signalling through version bits; such headers always hash with sha256d.
pub const VERSIONBITS_TOP_BITS: i32 = 0x2000_0000;

/// Bit position of the PoW type inside the header version.
pub const POW_TYPE_BIT: u32 = 16;

/// Mask applied after shifting the header version by [`POW_TYPE_BIT`].
pub const POW_TYPE_MASK: i32 = 0xff;

/// Blocks between the parent and the second block mixed into the deterministic random string.
pub const DETERMINISTIC_RAND_DEPTH: u32 = 9;

/// Minimum size of the bee proof script carried in coinbase output 0.
pub const BEE_PROOF_SCRIPT_MIN_SIZE: usize = 144;

/// Length of a transaction id in the ascii hex form carried by a bee proof.
pub const BEE_PROOF_TXID_HEX_LEN: usize = 64;

/// Length of a compact recoverable signature.
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Size of a pay-to-pubkey-hash script.
pub const P2PKH_SCRIPT_SIZE: usize = 25;
