//! sigbloom - compact membership filters for threat-intelligence feeds.
//!
//! This crate ingests file-hash signature lists and domain blocklists and
//! compresses them into four Bloom filters (MD5, SHA1, SHA256, domains)
//! that consumers can query offline without holding the full corpus.
//!
//! # Features
//!
//! - **Format-aware parsing**: ClamAV `.hdb/.hsb/.hdu/.hsu`, plain `.md5/.sha1/.sha256/.hashes`,
//!   LOKI `.loki`, best-effort `.txt`, any of them gzip-compressed
//! - **Allowlists**: excluded hashes are never accumulated, and are re-checked after the build
//! - **Cross-run dedup**: extended builds skip MD5s already in the previous production filter
//! - **Two sizing strategies**: pre-sized streaming or exact sizing to the realized population
//! - **Compatible artifacts**: the serialized layout matches Guava's `BloomFilter.writeTo`
//!
//! # Quick Start
//!
//! ```ignore
//! use sigbloom::{BuildConfig, Pipeline, SizingStrategy};
//!
//! let config = BuildConfig {
//!     strategy: SizingStrategy::Exact,
//!     ..Default::default()
//! };
//! let report = Pipeline::new("/srv/hypatia/signatures/", config)
//!     .with_domain_list("/srv/hypatia/domains.txt")
//!     .run()?;
//! println!("md5 added: {}", report.statistics.md5.added);
//! ```
//!
//! # Querying an artifact
//!
//! ```ignore
//! use sigbloom::BloomFilter;
//!
//! let md5 = BloomFilter::open("hypatia-md5-bloom.bin")?;
//! if md5.might_contain("44d88612fea8a8f36de82e1278abb02f") {
//!     println!("probably known-bad");
//! }
//! ```

mod error;
mod signature;

pub mod artifact;
pub mod bloom;
pub mod builder;
pub mod check;
pub mod config;
pub mod ingest;
pub mod layout;
pub mod pipeline;
pub mod source;
pub mod stats;

// Re-export core types
pub use error::{Error, Result};
pub use signature::{classify, is_hexadecimal, normalize, FilterKind, SignatureKind, Validation};

// Re-export the filter and its builders
pub use bloom::BloomFilter;
pub use builder::{ExactBuilder, FilterBuilder, FilterPlan, FilterSet, SizingStrategy, StreamingBuilder};

// Re-export run configuration and orchestration
pub use config::{BuildConfig, Capacities, MissingExclusions, RunMode};
pub use ingest::{ExclusionSet, Outcome, PriorSnapshot, RunContext};
pub use pipeline::Pipeline;
pub use source::{Reporting, SourceFile, SourceFormat};
pub use stats::{RunReport, RunStatistics};
