//! Status codes and domain errors for option series resolution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::fields::FieldError;

use super::alias::AliasError;

/// Outcome taxonomy shared by every layer.
///
/// `OutOfRange` only ever describes a single rejected candidate inside the
/// bound filters and is never returned from a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    /// Completed successfully.
    Success,
    /// Generic upstream or query failure.
    Failure,
    /// Malformed input (e.g. a root symbol without an exchange separator).
    InvalidParameter,
    /// Candidate value outside the filter bounds.
    OutOfRange,
    /// Nothing matched the filter.
    NoMatch,
}

impl StatusCode {
    /// Reason string for logs and metric labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::NoMatch => "NO_MATCH",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Failure to decode a root's expiration or strike universe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    /// Universe field could not be read.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Strike list blob length is not a whole number of records.
    #[error("strike list of {len} bytes is not a multiple of {record} byte records")]
    TruncatedStrikeList {
        /// Blob length.
        len: usize,
        /// Record width.
        record: usize,
    },

    /// Strike record scale exceeds decimal precision.
    #[error("strike scale {scale} exceeds the supported maximum")]
    InvalidScale {
        /// Offending scale byte.
        scale: u8,
    },

    /// Strike mantissa does not fit in a strike record.
    #[error("strike {strike} does not fit in a strike list record")]
    StrikeOutOfRange {
        /// Offending strike.
        strike: Decimal,
    },

    /// Expiration list contains an unparsable date code.
    #[error("invalid expiration code '{code}'")]
    InvalidExpiration {
        /// Offending code.
        code: String,
    },
}

/// Reasons a root produced no search patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Root symbol has no exchange separator.
    #[error("option root '{symbol}' has no exchange separator")]
    InvalidRoot {
        /// Offending root symbol.
        symbol: String,
    },

    /// Filter excluded every candidate, or the universe was empty.
    #[error("no option series under '{root}' match the filter")]
    NoMatch {
        /// Root base that was searched.
        root: String,
    },

    /// Root universe could not be decoded.
    #[error("failed to decode universe of '{root}': {source}")]
    Universe {
        /// Root base being decoded.
        root: String,
        /// Underlying decode error.
        #[source]
        source: UniverseError,
    },

    /// Alias encoder rejected a combination.
    #[error(transparent)]
    Alias(#[from] AliasError),
}

impl PatternError {
    /// Status code for this error.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::InvalidRoot { .. } | Self::Alias(_) => StatusCode::InvalidParameter,
            Self::NoMatch { .. } => StatusCode::NoMatch,
            Self::Universe { .. } => StatusCode::Failure,
        }
    }
}
