//! Allowlist loading.

use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashSet;

use super::for_each_line;
use crate::config::MissingExclusions;
use crate::layout::list_files;
use crate::signature::{is_hexadecimal, SignatureKind};
use crate::{Error, Result};

/// Normalized hex signatures that must never be accumulated.
///
/// Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    hashes: AHashSet<String>,
}

impl ExclusionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one allowlist line: a bare hash or `hash:comment`.
    ///
    /// Returns the lowercased hash if it is hex of length 32, 40 or 64.
    pub fn parse_line(line: &str) -> Option<String> {
        let line = line.trim().to_lowercase();
        let hash = match line.find(':') {
            Some(idx) => &line[..idx],
            None => line.as_str(),
        };
        if hash.starts_with('#') || !is_hexadecimal(hash) || SignatureKind::from_len(hash.len()).is_none() {
            return None;
        }
        Some(hash.to_string())
    }

    /// Add every valid line of `reader`. Returns the number of lines admitted.
    ///
    /// Lines are decoded lossily; a non-UTF-8 byte only spoils its own line.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut admitted = 0;
        for_each_line(reader, |line| {
            if let Some(hash) = Self::parse_line(line) {
                self.hashes.insert(hash);
                admitted += 1;
            }
        })?;
        Ok(admitted)
    }

    /// Load every file in `dir`, in sorted order.
    ///
    /// An unreadable file is logged and skipped. An absent or unlistable
    /// directory is handled per `policy`.
    pub fn load_dir(dir: &Path, policy: MissingExclusions) -> Result<Self> {
        let mut set = Self::new();

        let mut files = match list_files(dir) {
            Ok(files) => files,
            Err(e) => {
                return match policy {
                    MissingExclusions::Warn => {
                        log::warn!("No exclusions loaded, cannot read {:?}: {}", dir, e);
                        Ok(set)
                    }
                    MissingExclusions::Fail => Err(Error::MissingDirectory(dir.to_path_buf())),
                };
            }
        };
        files.sort();

        for path in files {
            let result = std::fs::File::open(&path)
                .map_err(Error::from)
                .and_then(|file| set.extend_from_reader(BufReader::new(file)));
            match result {
                Ok(_) => log::info!("\t{}", display_name(&path)),
                Err(e) => log::error!("Failed to read exclusions {:?}: {}", path, e),
            }
        }

        log::info!("\tLoaded {} excluded hashes", set.len());
        Ok(set)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hashes.iter().map(|s| s.as_str())
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionSet {
    /// Collect lines, keeping only those that parse as allowlist entries.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let hashes = iter
            .into_iter()
            .filter_map(|line| Self::parse_line(line.as_ref()))
            .collect();
        Self { hashes }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
