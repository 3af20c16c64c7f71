use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid address checksum")]
    InvalidAddressChecksum,

    #[error("Invalid address length: {0} bytes")]
    InvalidAddressLength(usize),

    #[error("Address version {found} does not belong to this network (expected {expected})")]
    WrongAddressVersion { expected: u8, found: u8 },

    #[error("Unexpected end of data while decoding {0}")]
    UnexpectedEof(&'static str),

    #[error("Trailing bytes after {0}")]
    TrailingBytes(&'static str),
}

pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;
