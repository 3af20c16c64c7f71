//! 256-bit target arithmetic shared by the consensus crates.
//!
//! Targets travel through headers in the 32-bit "compact" form: the top byte is the size of the
//! number in bytes, the low 23 bits are the mantissa and bit 23 is a sign flag. Decoding keeps
//! track of the sign and overflow conditions so that validators can reject them explicitly.

pub use primitive_types::U256;

use std::fmt;

/// Mantissa bits of a compact target.
pub const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;
/// Sign bit of a compact target.
pub const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// A decoded compact target together with its sign and overflow flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactTarget {
    pub value: U256,
    pub negative: bool,
    pub overflow: bool,
}

impl CompactTarget {
    /// Decodes `bits`. Never fails; malformed encodings are reported through the flags.
    pub fn from_bits(bits: u32) -> Self {
        let size = bits >> 24;
        let mut word = bits & COMPACT_MANTISSA_MASK;
        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            U256::from(word)
        } else {
            let shift = 8 * (size as usize - 3);
            if shift >= 256 {
                U256::zero()
            } else {
                U256::from(word) << shift
            }
        };
        let negative = word != 0 && (bits & COMPACT_SIGN_BIT) != 0;
        let overflow = word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        Self { value, negative, overflow }
    }

    /// True when the target is usable as a proof-of-work threshold.
    pub fn is_valid(&self) -> bool {
        !self.negative && !self.overflow && !self.value.is_zero()
    }
}

impl fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064x}", self.value)?;
        if self.negative {
            write!(f, " (negative)")?;
        }
        if self.overflow {
            write!(f, " (overflow)")?;
        }
        Ok(())
    }
}

/// Decodes a compact target, discarding the flags.
pub fn target_from_bits(bits: u32) -> U256 {
    CompactTarget::from_bits(bits).value
}

/// Encodes a non-negative target into compact form.
pub fn bits_from_target(target: &U256) -> u32 {
    compact_from_target(target, false)
}

/// Encodes a target into compact form, setting the sign bit when `negative` and the mantissa is non-zero.
pub fn compact_from_target(target: &U256, negative: bool) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*target >> (8 * (size - 3))).low_u64() as u32
    };
    // The sign bit is not part of the mantissa; move to a larger size when it would be set.
    if compact & COMPACT_SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    compact |= (size as u32) << 24;
    if negative && compact & COMPACT_MANTISSA_MASK != 0 {
        compact |= COMPACT_SIGN_BIT;
    }
    compact
}

/// Floating point difficulty of a compact target, relative to the `0x1d00ffff` minimum.
pub fn difficulty_from_bits(bits: u32) -> f64 {
    let mut shift = (bits >> 24) & 0xff;
    let mut difficulty = f64::from(0x0000_ffffu32) / f64::from(bits & 0x00ff_ffff);
    while shift < 29 {
        difficulty *= 256.0;
        shift += 1;
    }
    while shift > 29 {
        difficulty /= 256.0;
        shift -= 1;
    }
    difficulty
}

/// Multiplies with the wrap-around semantics of fixed width 256-bit consensus arithmetic.
pub fn wrapping_mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

/// Adds with the wrap-around semantics of fixed width 256-bit consensus arithmetic.
pub fn wrapping_add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}
