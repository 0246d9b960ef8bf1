//! Error types for buffer edits, searching and syntax configuration.

use crate::point::Point;
use thiserror::Error;

/// Rejected buffer operation. The buffer is never modified when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("line {line} is out of range (buffer has {line_count} lines)")]
    InvalidLine { line: usize, line_count: usize },

    #[error("column {col} is out of range for line {line} (length {len})")]
    InvalidColumn { line: usize, col: usize, len: usize },

    #[error("range end {end} precedes its begin {begin}")]
    InvalidRange { begin: Point, end: Point },

    #[error("input is not valid {encoding}")]
    Decode { encoding: &'static str },
}

/// Find/replace failure. "No match" is not an error: it is `Ok(None)` or an
/// empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FindError {
    #[error("search pattern is empty")]
    EmptyPattern,

    #[error("invalid regex pattern: {0}")]
    Pattern(String),

    /// Reverse search is not supported in combination with regex search.
    #[error("reverse search is not supported for regex patterns")]
    ReverseRegex,

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Quote rule rejected at registration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteRuleError {
    #[error("quote rule has an empty start marker")]
    EmptyStartMarker,

    #[error("multi-line quote rule starting with {0:?} has an empty end marker")]
    EmptyEndMarker(String),

    #[error("start marker {0:?} is already registered by another quote rule")]
    DuplicateStartMarker(String),
}

/// Invalid text options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("tab stop must be at least 1")]
    ZeroTabStop,

    #[error("shift width must be at least 1")]
    ZeroShiftWidth,
}
