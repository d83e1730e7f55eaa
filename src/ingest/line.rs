//! Format-aware token extraction.

use crate::source::SourceFormat;

/// Result of extracting a candidate token from a raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    /// Trimmed, lowercased candidate for validation
    Token(String),
    /// Line carries nothing to validate (empty, or missing the format's separator)
    Skip,
}

/// Extract the candidate signature from `line` according to `format`.
///
/// Separated formats take field 0 and ignore lines lacking the separator.
/// Whole-line formats take the trimmed line.
pub fn extract_token(line: &str, format: SourceFormat) -> LineToken {
    let line = line.trim();
    if line.is_empty() {
        return LineToken::Skip;
    }

    let token = match format.separator() {
        Some(sep) => match line.split_once(sep) {
            Some((field, _)) => field.trim(),
            None => return LineToken::Skip,
        },
        None => line,
    };
    LineToken::Token(token.to_lowercase())
}
