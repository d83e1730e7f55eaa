//! Source feed files: format detection and transparent decompression.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Line format of a signature feed, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// ClamAV hash databases (`.hdb .hsb .hdu .hsu`): `hash:size:name:version`
    Clamav,
    /// One digest per line (`.md5 .sha1 .sha256 .hashes`)
    Hashes,
    /// LOKI IOC lists (`.loki`): `hash;comment`
    Loki,
    /// Free-form text (`.txt`), ingested best-effort
    Text,
}

impl SourceFormat {
    /// Detect the format from an extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "hdb" | "hsb" | "hdu" | "hsu" => Some(SourceFormat::Clamav),
            "md5" | "sha1" | "sha256" | "hashes" => Some(SourceFormat::Hashes),
            "loki" => Some(SourceFormat::Loki),
            "txt" => Some(SourceFormat::Text),
            _ => None,
        }
    }

    /// Field separator, if the format carries extra columns.
    pub fn separator(self) -> Option<char> {
        match self {
            SourceFormat::Clamav => Some(':'),
            SourceFormat::Loki => Some(';'),
            SourceFormat::Hashes | SourceFormat::Text => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Clamav => "clamav",
            SourceFormat::Hashes => "hashes",
            SourceFormat::Loki => "loki",
            SourceFormat::Text => "text",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How loudly rejected tokens of a format are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reporting {
    /// Log every rejected token at info level.
    #[default]
    Verbose,
    /// Count rejected tokens, log them at debug level only.
    Quiet,
}

/// A recognized signature feed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub compressed: bool,
}

impl SourceFile {
    /// Recognize a feed by its file name.
    ///
    /// A trailing `.gz` marks the file compressed; the format then comes
    /// from the extension underneath (`feed.hdb.gz` is a ClamAV feed).
    /// Returns `None` for files this crate does not ingest.
    pub fn detect(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let name = path.file_name()?.to_str()?;

        let (stem, compressed) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (name, false),
        };
        let ext = Path::new(stem).extension()?.to_str()?;
        let format = SourceFormat::from_extension(ext)?;

        Some(Self {
            path: path.to_path_buf(),
            format,
            compressed,
        })
    }

    /// File name for progress output.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Open the file for line reading, decompressing if needed.
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        open_lines(&self.path, self.compressed)
    }
}

/// Open a file as a buffered line source, optionally through a gzip decoder.
pub fn open_lines(path: &Path, compressed: bool) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if compressed {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
