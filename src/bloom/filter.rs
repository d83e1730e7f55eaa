//! Bloom filter over ASCII strings.

use std::borrow::Cow;

use super::format::{filter_params, FilterParams, WORD_BITS};
use crate::{Error, Result};

/// Capacity and target rate a filter was sized for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub expected_insertions: u64,
    pub target_fpp: f64,
}

/// Probabilistic set membership with no false negatives.
///
/// Indexes are derived from a single Murmur3 x64-128 hash of the value's
/// bytes (seed 0): `h1 + i * h2` for `i in 0..k`, masked to a non-negative
/// 63-bit value and reduced modulo the bit size.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    words: Vec<u64>,
    num_hash_functions: u32,
    bit_count: u64,
    sizing: Option<Sizing>,
}

impl BloomFilter {
    /// Create an empty filter sized for `expected_insertions` at `fpp`.
    pub fn with_capacity(expected_insertions: u64, fpp: f64) -> Result<Self> {
        let params = filter_params(expected_insertions, fpp)?;
        let mut filter = Self::with_params(params);
        filter.sizing = Some(Sizing {
            expected_insertions: expected_insertions.max(1),
            target_fpp: fpp,
        });
        Ok(filter)
    }

    /// Create an empty filter with explicit geometry.
    pub fn with_params(params: FilterParams) -> Self {
        Self {
            words: vec![0; params.word_count().max(1)],
            num_hash_functions: params.num_hash_functions.max(1),
            bit_count: 0,
            sizing: None,
        }
    }

    /// Rebuild a filter from raw words, e.g. after deserialization.
    pub fn from_words(words: Vec<u64>, num_hash_functions: u32) -> Result<Self> {
        if words.is_empty() {
            return Err(Error::DegenerateFilter("empty bit array".to_string()));
        }
        if num_hash_functions == 0 {
            return Err(Error::DegenerateFilter("zero hash functions".to_string()));
        }
        let bit_count = words.iter().map(|w| w.count_ones() as u64).sum();
        Ok(Self {
            words,
            num_hash_functions,
            bit_count,
            sizing: None,
        })
    }

    /// Insert a value. Returns `true` if any bit changed.
    ///
    /// A `false` return means the value was (probably) already present.
    pub fn put(&mut self, value: &str) -> bool {
        let bit_size = self.bit_size();
        let (h1, h2) = hash_pair(&ascii_bytes(value));

        let mut changed = false;
        let mut combined = h1;
        for _ in 0..self.num_hash_functions {
            changed |= self.set_bit((combined & i64::MAX as u64) % bit_size);
            combined = combined.wrapping_add(h2);
        }
        changed
    }

    /// Membership query. `false` is definite, `true` may be a false positive.
    pub fn might_contain(&self, value: &str) -> bool {
        let bit_size = self.bit_size();
        let (h1, h2) = hash_pair(&ascii_bytes(value));

        let mut combined = h1;
        for _ in 0..self.num_hash_functions {
            if !self.get_bit((combined & i64::MAX as u64) % bit_size) {
                return false;
            }
            combined = combined.wrapping_add(h2);
        }
        true
    }

    /// Estimated number of distinct values inserted, from the fill ratio.
    pub fn approximate_element_count(&self) -> u64 {
        let bit_size = self.bit_size() as f64;
        let fraction_set = self.bit_count as f64 / bit_size;
        let estimate = -(-fraction_set).ln_1p() * bit_size / self.num_hash_functions as f64;
        estimate.round() as u64
    }

    /// Probability that a value never inserted is reported present,
    /// given the current fill.
    pub fn expected_fpp(&self) -> f64 {
        (self.bit_count as f64 / self.bit_size() as f64).powi(self.num_hash_functions as i32)
    }

    /// Bit array length.
    pub fn bit_size(&self) -> u64 {
        self.words.len() as u64 * WORD_BITS
    }

    /// Number of bits set.
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    pub fn num_hash_functions(&self) -> u32 {
        self.num_hash_functions
    }

    /// Sizing inputs, if this filter was created in-process.
    pub fn sizing(&self) -> Option<Sizing> {
        self.sizing
    }

    /// Raw storage words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    fn set_bit(&mut self, index: u64) -> bool {
        let word = &mut self.words[(index / WORD_BITS) as usize];
        let mask = 1u64 << (index % WORD_BITS);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.bit_count += 1;
        true
    }

    fn get_bit(&self, index: u64) -> bool {
        self.words[(index / WORD_BITS) as usize] & (1u64 << (index % WORD_BITS)) != 0
    }
}

/// US-ASCII encoding, each non-ASCII character replaced by `?`.
fn ascii_bytes(value: &str) -> Cow<'_, [u8]> {
    if value.is_ascii() {
        Cow::Borrowed(value.as_bytes())
    } else {
        Cow::Owned(
            value
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        )
    }
}

/// Lower and upper halves of the Murmur3 x64-128 digest.
fn hash_pair(bytes: &[u8]) -> (u64, u64) {
    let mut source = bytes;
    let hash = murmur3::murmur3_x64_128(&mut source, 0)
        .expect("reading from an in-memory slice cannot fail");
    (hash as u64, (hash >> 64) as u64)
}
