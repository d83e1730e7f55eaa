//! Bloom filter construction and the binary artifact format.
//!
//! # File Structure
//!
//! ```text
//! +------------------+
//! |     HEADER       |  6 bytes (strategy, hash count, word count)
//! +------------------+
//! |    BIT ARRAY     |  word count x 8 bytes
//! +------------------+
//! ```
//!
//! See [`format`] for the exact field layout and the sizing formulas.

mod filter;
pub mod format;
mod reader;
mod writer;


pub use filter::{BloomFilter, Sizing};
pub use format::{filter_params, FilterParams, DEFAULT_FPP};
