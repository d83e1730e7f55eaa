//! Filter serialization.

use std::io::Write;

use super::filter::BloomFilter;
use super::format::*;
use crate::{Error, Result};

impl BloomFilter {
    /// Serialize the filter into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let hash_count = u8::try_from(self.num_hash_functions())
            .map_err(|_| Error::HashCountOutOfRange(self.num_hash_functions() as u64))?;
        let word_count = i32::try_from(self.words().len())
            .map_err(|_| Error::DegenerateFilter(format!("{} words", self.words().len())))?;

        writer.write_all(&[STRATEGY_MURMUR128_MITZ_64, hash_count])?;
        writer.write_all(&word_count.to_be_bytes())?;
        for word in self.words() {
            writer.write_all(&word.to_be_bytes())?;
        }
        Ok(())
    }

    /// Serialize the filter into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(HEADER_SIZE + self.words().len() * 8);
        self.write_to(&mut output)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        let data = filter.to_bytes().unwrap();

        assert_eq!(data[0], STRATEGY_MURMUR128_MITZ_64);
        assert_eq!(data[1] as u32, filter.num_hash_functions());
        let words = i32::from_be_bytes(data[2..6].try_into().unwrap());
        assert_eq!(words as usize, filter.words().len());
        assert_eq!(data.len(), HEADER_SIZE + filter.words().len() * 8);
    }

    #[test]
    fn test_words_are_big_endian() {
        let filter = BloomFilter::from_words(vec![1, 0x8000_0000_0000_0000], 3).unwrap();
        let data = filter.to_bytes().unwrap();
        assert_eq!(&data[HEADER_SIZE..HEADER_SIZE + 8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(data[HEADER_SIZE + 8], 0x80);
    }

    #[test]
    fn test_hash_count_must_fit_byte() {
        let filter = BloomFilter::from_words(vec![0; 2], 300).unwrap();
        assert!(matches!(filter.to_bytes(), Err(Error::HashCountOutOfRange(300))));
    }
}
