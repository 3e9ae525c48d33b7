//! Error types for listing extraction
//!
//! Every variant is recoverable: the crawl engine logs the failure, counts it
//! and moves on to the next fragment.

use thiserror::Error;

/// Result type alias for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Fragment has no element content (empty, whitespace or bare text)
    #[error("Fragment has no parseable markup")]
    Parse,

    /// Level/location block missing or not split by a line break
    #[error("Level/location block has {segments} segment(s), expected at least 2")]
    MalformedLocationFormat { segments: usize },

    /// Listing anchor or its `href` is missing
    #[error("Listing link has no URL")]
    MissingUrl,
}

impl ExtractionError {
    /// Short label used in log lines and counters
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Parse => "parse",
            ExtractionError::MalformedLocationFormat { .. } => "malformed_location_format",
            ExtractionError::MissingUrl => "missing_url",
        }
    }
}
