//! Artifact layout constants and filter sizing.
//!
//! The on-disk layout matches the one produced by Guava's
//! `BloomFilter.writeTo`, so artifacts stay interchangeable with
//! consumers already deployed against it:
//!
//! ```text
//! +----------------------+
//! | STRATEGY (1 byte)    |  1 = Murmur3 128-bit, "mitz 64" index derivation
//! +----------------------+
//! | HASH COUNT (1 byte)  |  unsigned
//! +----------------------+
//! | WORD COUNT (4 bytes) |  i32 BE, number of 64-bit words
//! +----------------------+
//! | WORDS                |  WORD COUNT x i64 BE
//! +----------------------+
//! ```

use std::f64::consts::LN_2;

use crate::{Error, Result};

/// Strategy ordinal for Murmur3 x64-128 with 64-bit index arithmetic.
pub const STRATEGY_MURMUR128_MITZ_64: u8 = 1;

/// Header size in bytes: strategy (1) + hash count (1) + word count (4).
pub const HEADER_SIZE: usize = 6;

/// Bits per storage word.
pub const WORD_BITS: u64 = 64;

/// Reference false positive rate for every filter.
pub const DEFAULT_FPP: f64 = 0.00001;

/// Derived filter geometry for a `(capacity, fpp)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    /// Bit array length, rounded up to whole words
    pub bit_size: u64,
    /// Number of hash functions
    pub num_hash_functions: u32,
}

impl FilterParams {
    /// Number of 64-bit words backing the bit array.
    pub fn word_count(&self) -> usize {
        (self.bit_size / WORD_BITS) as usize
    }
}

/// Reject rates outside the open interval (0, 1), NaN included.
pub fn validate_fpp(fpp: f64) -> Result<f64> {
    if fpp > 0.0 && fpp < 1.0 {
        Ok(fpp)
    } else {
        Err(Error::InvalidFalsePositiveRate(fpp))
    }
}

/// `m = -n ln p / (ln 2)^2`, truncated.
pub fn optimal_num_of_bits(expected_insertions: u64, fpp: f64) -> u64 {
    (-(expected_insertions as f64) * fpp.ln() / (LN_2 * LN_2)) as u64
}

/// `k = max(1, round(m / n * ln 2))`.
pub fn optimal_num_of_hash_functions(expected_insertions: u64, num_bits: u64) -> u32 {
    let k = (num_bits as f64 / expected_insertions as f64 * LN_2).round();
    (k as u32).max(1)
}

/// Closed-form sizing shared by both construction strategies.
///
/// A capacity of zero is treated as one. The hash count is derived from
/// the untruncated bit count before it is rounded up to whole words.
pub fn filter_params(expected_insertions: u64, fpp: f64) -> Result<FilterParams> {
    let fpp = validate_fpp(fpp)?;
    let n = expected_insertions.max(1);
    let num_bits = optimal_num_of_bits(n, fpp);
    let num_hash_functions = optimal_num_of_hash_functions(n, num_bits);
    if num_hash_functions > u8::MAX as u32 {
        return Err(Error::HashCountOutOfRange(num_hash_functions as u64));
    }

    let words = num_bits.div_ceil(WORD_BITS).max(1);
    Ok(FilterParams {
        bit_size: words * WORD_BITS,
        num_hash_functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sizing() {
        let params = filter_params(7_600_000, DEFAULT_FPP).unwrap();
        assert_eq!(params.num_hash_functions, 17);
        assert!((182_116_000..=182_116_200).contains(&params.bit_size));
        assert_eq!(params.bit_size % WORD_BITS, 0);

        let params = filter_params(1000, 0.01).unwrap();
        assert_eq!(params.num_hash_functions, 7);
        assert_eq!(params.bit_size, 9600);
    }

    #[test]
    fn test_sizing_is_deterministic() {
        let a = filter_params(52_000_000, DEFAULT_FPP).unwrap();
        let b = filter_params(52_000_000, DEFAULT_FPP).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_capacity_is_one() {
        assert_eq!(filter_params(0, 0.01).unwrap(), filter_params(1, 0.01).unwrap());
    }

    #[test]
    fn test_tiny_filter_gets_one_word() {
        let params = filter_params(1, 0.9).unwrap();
        assert_eq!(params.bit_size, WORD_BITS);
        assert!(params.num_hash_functions >= 1);
    }

    #[test]
    fn test_invalid_fpp() {
        assert!(filter_params(10, 0.0).is_err());
        assert!(filter_params(10, 1.0).is_err());
        assert!(filter_params(10, f64::NAN).is_err());
        assert!(filter_params(10, -0.5).is_err());
    }
}
