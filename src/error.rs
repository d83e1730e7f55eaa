//! Error types for sigbloom.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for sigbloom operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Artifact is too short to contain a filter header
    #[error("invalid header size: expected at least {expected}, got {actual}")]
    InvalidHeaderSize { expected: usize, actual: usize },

    /// Artifact was written with a hashing strategy we cannot reproduce
    #[error("unsupported hash strategy ordinal: {0}")]
    UnsupportedStrategy(u8),

    /// Declared bit array length does not match the payload
    #[error("truncated bit array: expected {expected} bytes, got {actual}")]
    TruncatedBits { expected: usize, actual: usize },

    /// Hash function count does not fit the artifact header
    #[error("hash function count out of range: {0}")]
    HashCountOutOfRange(u64),

    /// Filter with zero hash functions or zero bits
    #[error("degenerate filter parameters: {0}")]
    DegenerateFilter(String),

    /// False positive rate outside (0, 1)
    #[error("false positive rate must be in (0, 1), got {0}")]
    InvalidFalsePositiveRate(f64),

    /// Required directory is absent or not a directory
    #[error("missing directory: {0}")]
    MissingDirectory(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for sigbloom operations.
pub type Result<T> = std::result::Result<T, Error>;
