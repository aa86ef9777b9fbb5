// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod num;

pub use self::num::{Coerce, Num};

/// Emit a `defmt` log message at the given level when the `defmt` feature is enabled.
///
/// With the feature disabled the arguments are not evaluated and nothing is emitted.
macro_rules! log {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        ::defmt::$level!($($arg)+);
    };
}
pub(crate) use log;

/// This is a very small reimplementation of [bytes::Buf] with just the parts needed for this
/// crate.
///
/// The AMG88xx is little endian, unlike most of the other devices on a typical I²C bus.
///
/// [bytes::Buf]: https://docs.rs/bytes/*/bytes/trait.Buf.html
pub(crate) trait Buffer {
    fn get_u16_le(&mut self) -> u16;
}

impl Buffer for &[u8] {
    fn get_u16_le(&mut self) -> u16 {
        let (bytes, rest) = self.split_at(2);
        *self = rest;
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}

/// Sign extend the lowest `num_bits` bits of `value` into an i16.
///
/// Any bits above `num_bits` are ignored.
pub(crate) fn i16_from_bits(value: u16, num_bits: u8) -> i16 {
    let shift_amount = 16 - num_bits;
    ((value << shift_amount) as i16) >> shift_amount
}

#[cfg(test)]
mod test {
    use super::Buffer;

    #[test]
    fn buffer_get_u16_le() {
        let data = b"\xde\xad\xbe\xef";
        let mut buf = &data[..];
        assert_eq!(buf.get_u16_le(), 0xadde);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get_u16_le(), 0xefbe);
        assert!(buf.is_empty());
    }

    #[test]
    fn is_bit_set() {
        for n in 0..8 {
            let value: u8 = 1 << n;
            assert!(
                super::is_bit_set(value, n),
                "is_bit_set was incorrect for bit {}",
                n
            );
            assert!(!super::is_bit_set(!value, n));
        }
    }

    #[test]
    fn i16_from_bits() {
        assert_eq!(super::i16_from_bits(0x00ff, 8), -1);
        assert_eq!(super::i16_from_bits(0x0fff, 12), -1);
        assert_eq!(super::i16_from_bits(0x07ff, 12), 2047);
        assert_eq!(super::i16_from_bits(0x0800, 12), -2048);
        // Now check that upper bits get ignored properly
        assert_eq!(super::i16_from_bits(0xf0ff, 8), -1);
        assert_eq!(super::i16_from_bits(0xf064, 12), 100);
    }
}
