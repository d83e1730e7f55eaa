//! Filter deserialization.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use super::filter::BloomFilter;
use super::format::*;
use crate::{Error, Result};

impl BloomFilter {
    /// Read a filter previously written by [`BloomFilter::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            let n = reader.read(&mut header[filled..])?;
            if n == 0 {
                return Err(Error::InvalidHeaderSize {
                    expected: HEADER_SIZE,
                    actual: filled,
                });
            }
            filled += n;
        }

        if header[0] != STRATEGY_MURMUR128_MITZ_64 {
            return Err(Error::UnsupportedStrategy(header[0]));
        }
        let num_hash_functions = header[1] as u32;
        let word_count = i32::from_be_bytes([header[2], header[3], header[4], header[5]]);
        if word_count <= 0 {
            return Err(Error::DegenerateFilter(format!("{} words", word_count)));
        }

        let word_count = word_count as usize;
        let mut words = Vec::with_capacity(word_count.min(1 << 20));
        let mut buf = [0u8; 8];
        for _ in 0..word_count {
            reader.read_exact(&mut buf).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => Error::TruncatedBits {
                    expected: word_count * 8,
                    actual: words.len() * 8,
                },
                _ => Error::Io(e),
            })?;
            words.push(u64::from_be_bytes(buf));
        }

        Self::from_words(words, num_hash_functions)
    }

    /// Load a filter from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut source = data;
        Self::read_from(&mut source)
    }

    /// Load a filter from a file.
    ///
    /// Supports both plain and gzip-compressed (`.gz`) artifacts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);

        let is_gzip = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "gz")
            .unwrap_or(false);

        if is_gzip {
            Self::read_from(&mut GzDecoder::new(file))
        } else {
            let mut file = file;
            Self::read_from(&mut file)
        }
    }
}
