//! Buffered construction, sized to the realized population.

use ahash::AHashSet;

use super::{FilterBuilder, FilterSet, SizingStrategy};
use crate::bloom::format::validate_fpp;
use crate::bloom::BloomFilter;
use crate::{FilterKind, Result};

/// Buffers distinct values per filter; no filter exists until [`finish`].
///
/// [`finish`]: FilterBuilder::finish
pub struct ExactBuilder {
    fpp: f64,
    buffers: [AHashSet<String>; 4],
}

impl ExactBuilder {
    pub fn new(fpp: f64) -> Result<Self> {
        Ok(Self {
            fpp: validate_fpp(fpp)?,
            buffers: Default::default(),
        })
    }

    /// Distinct values buffered so far for `kind`.
    pub fn buffered(&self, kind: FilterKind) -> usize {
        self.buffers[kind.index()].len()
    }
}

impl FilterBuilder for ExactBuilder {
    fn strategy(&self) -> SizingStrategy {
        SizingStrategy::Exact
    }

    fn accumulate(&mut self, kind: FilterKind, value: &str) -> bool {
        let buffer = &mut self.buffers[kind.index()];
        if buffer.contains(value) {
            return false;
        }
        buffer.insert(value.to_string())
    }

    fn finish(self: Box<Self>) -> Result<FilterSet> {
        let Self { fpp, buffers } = *self;
        let [md5, sha1, sha256, domains] = buffers;
        Ok(FilterSet::new([
            materialize(md5, fpp)?,
            materialize(sha1, fpp)?,
            materialize(sha256, fpp)?,
            materialize(domains, fpp)?,
        ]))
    }
}

/// Size a filter to the buffer's cardinality (at least one) and bulk-insert it.
fn materialize(values: AHashSet<String>, fpp: f64) -> Result<BloomFilter> {
    let mut filter = BloomFilter::with_capacity((values.len() as u64).max(1), fpp)?;
    for value in &values {
        filter.put(value);
    }
    Ok(filter)
}
