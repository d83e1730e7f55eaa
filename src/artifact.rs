//! Artifact writer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bloom::BloomFilter;
use crate::builder::FilterSet;
use crate::layout::Layout;
use crate::{FilterKind, Result};

/// Outcome of writing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: FilterKind,
    pub path: PathBuf,
    /// Size in bytes, if written
    pub bytes: Option<u64>,
    /// Hex SHA-256 of the written blob
    pub sha256: Option<String>,
    /// Failure message, if the write failed
    pub error: Option<String>,
}

/// Serialize one filter to `path`, replacing any existing file.
///
/// Returns the number of bytes written and their SHA-256.
pub fn write_artifact(filter: &BloomFilter, path: &Path) -> Result<(u64, String)> {
    let data = filter.to_bytes()?;
    fs::write(path, &data)?;
    Ok((data.len() as u64, format!("{:x}", Sha256::digest(&data))))
}

/// Write all four filters independently.
///
/// A failure is logged and recorded, and the remaining artifacts are still
/// attempted; there is no all-or-nothing guarantee across the set.
pub fn write_artifacts(filters: &FilterSet, layout: &Layout) -> Vec<ArtifactRecord> {
    filters
        .iter()
        .map(|(kind, filter)| {
            let path = layout.artifact_path(kind);
            match write_artifact(filter, &path) {
                Ok((bytes, sha256)) => {
                    log::info!("Wrote {:?} ({} bytes)", path, bytes);
                    ArtifactRecord {
                        kind,
                        path,
                        bytes: Some(bytes),
                        sha256: Some(sha256),
                        error: None,
                    }
                }
                Err(e) => {
                    log::error!("Failed to write {:?}: {}", path, e);
                    ArtifactRecord {
                        kind,
                        path,
                        bytes: None,
                        sha256: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
