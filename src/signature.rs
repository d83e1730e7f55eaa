//! Signature normalization, validation and classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum token length considered for validation.
pub const MIN_TOKEN_LEN: usize = 4;

/// Hex digest kinds, determined solely by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// 32 hex characters
    Md5,
    /// 40 hex characters
    Sha1,
    /// 64 hex characters
    Sha256,
}

impl SignatureKind {
    /// All signature kinds, in output order.
    pub const ALL: [SignatureKind; 3] = [SignatureKind::Md5, SignatureKind::Sha1, SignatureKind::Sha256];

    /// Classify a hex length.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(SignatureKind::Md5),
            40 => Some(SignatureKind::Sha1),
            64 => Some(SignatureKind::Sha256),
            _ => None,
        }
    }

    /// Number of hex characters for this kind.
    pub fn hex_len(self) -> usize {
        match self {
            SignatureKind::Md5 => 32,
            SignatureKind::Sha1 => 40,
            SignatureKind::Sha256 => 64,
        }
    }

    /// The filter this kind is accumulated into.
    pub fn filter(self) -> FilterKind {
        match self {
            SignatureKind::Md5 => FilterKind::Md5,
            SignatureKind::Sha1 => FilterKind::Sha1,
            SignatureKind::Sha256 => FilterKind::Sha256,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        self.filter().as_str()
    }
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four output filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Md5,
    Sha1,
    Sha256,
    Domains,
}

impl FilterKind {
    /// All filters, in output order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Md5,
        FilterKind::Sha1,
        FilterKind::Sha256,
        FilterKind::Domains,
    ];

    /// Dense index, used for per-filter arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Md5 => "md5",
            FilterKind::Sha1 => "sha1",
            FilterKind::Sha256 => "sha256",
            FilterKind::Domains => "domains",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of validating a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Empty or a `#` comment; not counted either way.
    Skip,
    /// Hex of a recognized digest length.
    Valid(SignatureKind),
    /// Hex, but not 32/40/64 characters long (or shorter than [`MIN_TOKEN_LEN`]).
    InvalidLength,
    /// Contains a non-hex character.
    NotHexadecimal,
}

/// Trim and lowercase a token. Idempotent.
pub fn normalize(token: &str) -> String {
    token.trim().to_lowercase()
}

/// True when the string is non-empty and every character is a hex digit.
pub fn is_hexadecimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate and classify an already-normalized token.
pub fn classify(token: &str) -> Validation {
    if token.is_empty() || token.starts_with('#') {
        return Validation::Skip;
    }
    if !is_hexadecimal(token) {
        return Validation::NotHexadecimal;
    }
    if token.len() < MIN_TOKEN_LEN {
        return Validation::InvalidLength;
    }
    match SignatureKind::from_len(token.len()) {
        Some(kind) => Validation::Valid(kind),
        None => Validation::InvalidLength,
    }
}
