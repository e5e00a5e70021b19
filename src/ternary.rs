//! Three-valued values as reported by the engine.
//!
//! The engine encodes every three-valued quantity as a pair of flags: one saying the
//! value may be one, one saying it may be zero. Both set means unknown, neither set
//! cannot be represented and is reported as a [`DecodeError`].

use std::fmt;

use thiserror::Error;

use crate::engine::PanicFlags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThreeValued {
    False,
    True,
    Unknown,
}

impl ThreeValued {
    pub fn from_flags(may_be_zero: bool, may_be_one: bool) -> Result<Self, DecodeError> {
        match (may_be_zero, may_be_one) {
            (true, false) => Ok(Self::False),
            (false, true) => Ok(Self::True),
            (true, true) => Ok(Self::Unknown),
            (false, false) => Err(DecodeError::InvalidTriState),
        }
    }

    pub fn bit_char(self) -> char {
        match self {
            Self::False => '0',
            Self::True => '1',
            Self::Unknown => 'X',
        }
    }
}

impl fmt::Display for ThreeValued {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::False => "false",
            Self::True => "true",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bit {position} is neither zero, one nor unknown")]
    InvalidBit { position: u32 },
    #[error("bit width {width} exceeds {max} bits", max = u64::BITS)]
    WidthTooLarge { width: u32 },
    #[error("value is neither false, true nor unknown")]
    InvalidTriState,
}

/// Decodes a ternary bit string from its `ones`/`zeros` masks, most significant bit first.
pub fn decode_ternary(ones: u64, zeros: u64, width: u32) -> Result<String, DecodeError> {
    if width > u64::BITS {
        return Err(DecodeError::WidthTooLarge { width });
    }

    let mut decoded = String::with_capacity(width as usize);
    for position in (0..width).rev() {
        let one = (ones >> position) & 1 == 1;
        let zero = (zeros >> position) & 1 == 1;
        let bit = ThreeValued::from_flags(zero, one)
            .map_err(|_| DecodeError::InvalidBit { position })?;
        decoded.push(bit.bit_char());
    }
    Ok(decoded)
}

pub fn decode_panic(flags: PanicFlags) -> Result<ThreeValued, DecodeError> {
    ThreeValued::from_flags(flags.zero, flags.one)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_most_significant_bit_first() {
        assert_eq!(decode_ternary(0b101, 0b010, 3), Ok("101".to_owned()));
        assert_eq!(decode_ternary(0b101, 0b011, 3), Ok("10X".to_owned()));
        assert_eq!(decode_ternary(0b110, 0b011, 3), Ok("1X0".to_owned()));
        assert_eq!(decode_ternary(0b100, 0b011, 3), Ok("100".to_owned()));
    }

    #[test]
    fn decodes_single_bits() {
        assert_eq!(decode_ternary(1, 1, 1), Ok("X".to_owned()));
        assert_eq!(decode_ternary(1, 0, 1), Ok("1".to_owned()));
        assert_eq!(decode_ternary(0, 1, 1), Ok("0".to_owned()));
        assert_eq!(
            decode_ternary(0, 0, 1),
            Err(DecodeError::InvalidBit { position: 0 })
        );
    }

    #[test]
    fn zero_width_is_empty() {
        assert_eq!(decode_ternary(0, 0, 0), Ok(String::new()));
    }

    #[test]
    fn reports_the_offending_position() {
        assert_eq!(
            decode_ternary(0b001, 0b010, 3),
            Err(DecodeError::InvalidBit { position: 2 })
        );
    }

    #[test]
    fn full_width_and_beyond() {
        let all_unknown = decode_ternary(u64::MAX, u64::MAX, 64).expect("64 bits decode");
        assert_eq!(all_unknown.len(), 64);
        assert!(all_unknown.chars().all(|bit| bit == 'X'));

        assert_eq!(
            decode_ternary(0, 0, 65),
            Err(DecodeError::WidthTooLarge { width: 65 })
        );
    }

    #[test]
    fn decodes_panic_flags() {
        let decode = |zero, one| decode_panic(PanicFlags { zero, one });
        assert_eq!(decode(true, false), Ok(ThreeValued::False));
        assert_eq!(decode(false, true), Ok(ThreeValued::True));
        assert_eq!(decode(true, true), Ok(ThreeValued::Unknown));
        assert_eq!(decode(false, false), Err(DecodeError::InvalidTriState));
    }
}
