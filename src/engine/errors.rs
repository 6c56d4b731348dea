// ============================================================================
// Feed Errors
// Error types for frame decoding and book maintenance
// ============================================================================

use crate::numeric::NumericError;
use std::fmt;

/// Errors raised while turning venue frames into book state.
///
/// `Decode` and `Numeric` reject a single frame. That includes a wire price
/// too large to fee-adjust. `Arithmetic` means arithmetic failed on values
/// the feed did not take from the wire; the feed state can no longer be
/// trusted, so it is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Frame is not valid JSON or lacks required fields
    Decode(String),
    /// A wire number could not be parsed or rescaled
    Numeric(NumericError),
    /// Arithmetic on validated values failed
    Arithmetic(NumericError),
    /// Invalid feed configuration
    Config(String),
}

impl FeedError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Arithmetic(_) | FeedError::Config(_))
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Decode(msg) => write!(f, "decode error: {}", msg),
            FeedError::Numeric(err) => write!(f, "bad wire number: {}", err),
            FeedError::Arithmetic(err) => write!(f, "arithmetic failure: {}", err),
            FeedError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Numeric(err) | FeedError::Arithmetic(err) => Some(err),
            _ => None,
        }
    }
}

/// Parsing failures are frame-level; use `FeedError::Arithmetic` explicitly
/// for failures on validated values.
impl From<NumericError> for FeedError {
    fn from(err: NumericError) -> Self {
        FeedError::Numeric(err)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Decode(err.to_string())
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
