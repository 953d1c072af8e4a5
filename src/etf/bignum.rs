// Big-integer digit rules for SMALL_BIG_EXT / LARGE_BIG_EXT.
//
// Magnitude is little-endian base 256; sign travels in its own byte
// (0 = non-negative, anything else = negative). Zero has no digits.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

/// SMALL_BIG_EXT payloads shorter than this decode with plain `i64`
/// arithmetic (at most 48 magnitude bits).
pub const PLAIN_DIGIT_LIMIT: usize = 7;

/// Below this digit count a negative sign is ignored when the value already
/// has bit 31 set.
const SIGN_OVERLAP_DIGITS: usize = 4;

/// Split `n` into its sign byte and little-endian magnitude digits.
pub fn to_digits(n: &BigInt) -> (u8, Vec<u8>) {
    let sign = u8::from(n.sign() == Sign::Minus);
    if n.is_zero() {
        return (sign, Vec::new());
    }
    (sign, n.magnitude().to_bytes_le())
}

/// Rebuild an arbitrary-precision value from sign byte and digits.
pub fn from_digits(sign: u8, digits: &[u8]) -> BigInt {
    let magnitude = BigUint::from_bytes_le(digits);
    let sign = if sign == 0 { Sign::Plus } else { Sign::Minus };
    BigInt::from_biguint(sign, magnitude)
}

/// Plain-number decoding for short SMALL_BIG_EXT payloads.
///
/// For fewer than four digits a negative sign only applies while bit 31 of
/// the magnitude is clear, matching fixed-width 32-bit encoders that reuse
/// the sign bit as a magnitude bit.
pub fn plain_value(sign: u8, digits: &[u8]) -> i64 {
    debug_assert!(digits.len() < PLAIN_DIGIT_LIMIT);
    let value = digits
        .iter()
        .rev()
        .fold(0i64, |acc, &d| (acc << 8) | i64::from(d));
    if sign == 0 {
        return value;
    }
    if digits.len() < SIGN_OVERLAP_DIGITS && value & (1 << 31) != 0 {
        return value;
    }
    -value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_no_digits() {
        assert_eq!(to_digits(&BigInt::zero()), (0, vec![]));
        assert_eq!(from_digits(0, &[]), BigInt::zero());
        assert_eq!(from_digits(1, &[]), BigInt::zero());
    }

    #[test]
    fn digits_are_little_endian() {
        let n = BigInt::from(0x0102_0304u32);
        assert_eq!(to_digits(&n), (0, vec![4, 3, 2, 1]));
        assert_eq!(to_digits(&-n), (1, vec![4, 3, 2, 1]));
    }

    #[test]
    fn powers_of_two_roundtrip() {
        for bits in [32u32, 64, 128] {
            let n = BigInt::from(1) << bits;
            for v in [n.clone(), -n] {
                let (sign, digits) = to_digits(&v);
                assert_eq!(digits.len() as u32, bits / 8 + 1);
                assert_eq!(from_digits(sign, &digits), v);
            }
        }
    }

    #[test]
    fn plain_value_signs() {
        assert_eq!(plain_value(0, &[1]), 1);
        assert_eq!(plain_value(1, &[1]), -1);
        assert_eq!(plain_value(0, &[0, 0, 0, 0, 1]), 1 << 32);
        assert_eq!(plain_value(1, &[0, 0, 0, 0, 1]), -(1 << 32));
        assert_eq!(plain_value(1, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]), -0xFFFF_FFFF_FFFF);
    }

    #[test]
    fn plain_value_four_digits_always_negates() {
        assert_eq!(plain_value(1, &[0, 0, 0, 0x80]), -(1i64 << 31));
    }

    #[test]
    fn plain_value_short_payload_negates() {
        // Three digits can never reach bit 31, so the sign always applies.
        assert_eq!(plain_value(1, &[0xFF, 0xFF, 0xFF]), -0xFF_FFFF);
        assert_eq!(plain_value(7, &[2]), -2);
    }
}
