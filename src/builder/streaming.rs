//! Pre-sized, insert-as-you-go construction.

use super::{FilterBuilder, FilterPlan, FilterSet, SizingStrategy};
use crate::bloom::BloomFilter;
use crate::{FilterKind, Result};

/// Allocates all four filters at creation and inserts each value as it streams past.
pub struct StreamingBuilder {
    filters: [BloomFilter; 4],
}

impl StreamingBuilder {
    pub fn new(plan: &FilterPlan) -> Result<Self> {
        let filter = |kind: FilterKind| BloomFilter::with_capacity(plan.capacity(kind), plan.fpp);
        Ok(Self {
            filters: [
                filter(FilterKind::Md5)?,
                filter(FilterKind::Sha1)?,
                filter(FilterKind::Sha256)?,
                filter(FilterKind::Domains)?,
            ],
        })
    }
}

impl FilterBuilder for StreamingBuilder {
    fn strategy(&self) -> SizingStrategy {
        SizingStrategy::Streaming
    }

    fn accumulate(&mut self, kind: FilterKind, value: &str) -> bool {
        self.filters[kind.index()].put(value)
    }

    fn finish(self: Box<Self>) -> Result<FilterSet> {
        Ok(FilterSet::new(self.filters))
    }
}
