//! On-disk layout around the signature directory.
//!
//! ```text
//! <root>/
//!   <signatures>/            input feeds, output artifacts
//!   exclusions/              allowlists
//!   extras/                  additional feeds (standard mode only)
//!   production/
//!     hypatia-md5-bloom.bin  prior MD5 filter (extended mode only)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RunMode;
use crate::source::SourceFile;
use crate::{Error, FilterKind, Result};

/// Paths derived from the base signature directory.
#[derive(Debug, Clone)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Directory holding the signature feeds; artifacts are written here too.
    pub fn signatures_dir(&self) -> &Path {
        &self.base
    }

    pub fn exclusions_dir(&self) -> PathBuf {
        self.sibling("exclusions")
    }

    pub fn extras_dir(&self) -> PathBuf {
        self.sibling("extras")
    }

    /// Default location of the previous production MD5 filter.
    pub fn prior_snapshot(&self) -> PathBuf {
        self.sibling("production").join(artifact_name(FilterKind::Md5))
    }

    /// Output path of one artifact.
    pub fn artifact_path(&self, kind: FilterKind) -> PathBuf {
        self.base.join(artifact_name(kind))
    }

    /// Collect every recognized feed, sorted by path.
    ///
    /// In standard mode the extras directory is merged in when present.
    /// Subdirectories and unrecognized extensions are ignored.
    pub fn discover_sources(&self, mode: RunMode) -> Result<Vec<SourceFile>> {
        if !self.base.is_dir() {
            return Err(Error::MissingDirectory(self.base.clone()));
        }

        let mut paths = list_files(&self.base)?;
        let extras = self.extras_dir();
        if !mode.is_extended() && extras.is_dir() {
            match list_files(&extras) {
                Ok(extra) => paths.extend(extra),
                Err(e) => log::error!("Failed to list extras {:?}: {}", extras, e),
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            match SourceFile::detect(&path) {
                Some(source) => sources.push(source),
                None => log::debug!("Ignoring unrecognized file {:?}", path),
            }
        }
        Ok(sources)
    }

    fn sibling(&self, name: &str) -> PathBuf {
        self.base.join("..").join(name)
    }
}

/// File name of the artifact for a filter.
pub fn artifact_name(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Md5 => "hypatia-md5-bloom.bin",
        FilterKind::Sha1 => "hypatia-sha1-bloom.bin",
        FilterKind::Sha256 => "hypatia-sha256-bloom.bin",
        FilterKind::Domains => "hypatia-domains-bloom.bin",
    }
}

/// Regular files directly inside `dir`.
pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
