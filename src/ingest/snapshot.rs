//! Previously published MD5 filter, used to skip hashes already shipped.

use std::path::Path;

use crate::bloom::BloomFilter;
use crate::Result;

/// Read-only membership oracle loaded from a prior MD5 artifact.
#[derive(Debug, Clone)]
pub struct PriorSnapshot {
    filter: BloomFilter,
}

impl PriorSnapshot {
    pub fn new(filter: BloomFilter) -> Self {
        Self { filter }
    }

    /// Load a snapshot from an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let filter = BloomFilter::open(path)?;
        Ok(Self::new(filter))
    }

    /// Load the snapshot if it exists.
    ///
    /// A missing file yields `None` with a warning; a corrupt or unreadable
    /// one yields `None` with an error. Neither stops the run.
    pub fn load_optional(path: &Path) -> Option<Self> {
        if !path.exists() {
            log::warn!("No prior snapshot at {:?}, MD5 dedup disabled", path);
            return None;
        }
        log::info!("Loading prior snapshot {:?}", path);
        match Self::load(path) {
            Ok(snapshot) => {
                log::info!("\tLoaded {} entries", snapshot.approximate_element_count());
                Some(snapshot)
            }
            Err(e) => {
                log::error!("Failed to load prior snapshot {:?}: {}", path, e);
                None
            }
        }
    }

    /// `true` if the hash was (probably) in the previous filter.
    pub fn might_contain(&self, hash: &str) -> bool {
        self.filter.might_contain(hash)
    }

    pub fn approximate_element_count(&self) -> u64 {
        self.filter.approximate_element_count()
    }
}
