//! Filter construction strategies.
//!
//! Both strategies implement [`FilterBuilder`] and are interchangeable:
//!
//! - [`StreamingBuilder`] allocates every filter up front from configured
//!   capacities and inserts values as they arrive. Memory stays constant,
//!   but the realized false positive rate drifts if the true population
//!   differs from the configured capacity.
//! - [`ExactBuilder`] buffers distinct values and sizes each filter to the
//!   realized population when ingestion ends. Memory grows with the number
//!   of distinct values; the delivered rate matches the target.

mod exact;
mod streaming;

pub use exact::ExactBuilder;
pub use streaming::StreamingBuilder;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bloom::BloomFilter;
use crate::{Error, FilterKind, Result};

/// Construction contract shared by both sizing strategies.
pub trait FilterBuilder {
    /// The strategy this builder implements.
    fn strategy(&self) -> SizingStrategy;

    /// Record a normalized value for `kind`.
    ///
    /// Returns `true` if the value was newly recorded, `false` if it was
    /// already present (for the streaming strategy: probably present).
    fn accumulate(&mut self, kind: FilterKind, value: &str) -> bool;

    /// Finalize and hand over the four filters.
    fn finish(self: Box<Self>) -> Result<FilterSet>;
}

/// Selectable sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingStrategy {
    /// Pre-sized filters, filled while streaming.
    #[default]
    Streaming,
    /// Buffered distinct values, filters sized to the realized count.
    Exact,
}

impl SizingStrategy {
    /// Create a builder for this strategy.
    pub fn builder(self, plan: &FilterPlan) -> Result<Box<dyn FilterBuilder>> {
        match self {
            SizingStrategy::Streaming => Ok(Box::new(StreamingBuilder::new(plan)?)),
            SizingStrategy::Exact => Ok(Box::new(ExactBuilder::new(plan.fpp)?)),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingStrategy::Streaming => "streaming",
            SizingStrategy::Exact => "exact",
        }
    }
}

impl fmt::Display for SizingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SizingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "streaming" | "stream" => Ok(SizingStrategy::Streaming),
            "exact" | "resize" => Ok(SizingStrategy::Exact),
            other => Err(Error::Config(format!("unknown sizing strategy: {}", other))),
        }
    }
}

/// Target rate and per-filter capacities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPlan {
    pub fpp: f64,
    /// Indexed by [`FilterKind::index`]
    pub capacities: [u64; 4],
}

impl FilterPlan {
    /// Same capacity for every filter.
    pub fn uniform(capacity: u64, fpp: f64) -> Self {
        Self {
            fpp,
            capacities: [capacity; 4],
        }
    }

    pub fn capacity(&self, kind: FilterKind) -> u64 {
        self.capacities[kind.index()]
    }
}

/// The four finalized filters.
#[derive(Debug, Clone)]
pub struct FilterSet {
    filters: [BloomFilter; 4],
}

impl FilterSet {
    /// Filters in [`FilterKind::ALL`] order.
    pub fn new(filters: [BloomFilter; 4]) -> Self {
        Self { filters }
    }

    pub fn get(&self, kind: FilterKind) -> &BloomFilter {
        &self.filters[kind.index()]
    }

    /// Membership query against the filter for `kind`.
    pub fn might_contain(&self, kind: FilterKind, value: &str) -> bool {
        self.get(kind).might_contain(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, &BloomFilter)> {
        FilterKind::ALL.into_iter().zip(self.filters.iter())
    }
}
