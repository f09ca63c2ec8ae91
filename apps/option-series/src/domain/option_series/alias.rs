//! Option Alias Encoding Port
//!
//! Contract aliases are the symbols the pattern-match query searches for.
//! The encoding is owned by the gateway vendor, so the domain only depends on
//! this trait and the concrete format lives in an infrastructure adapter.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::contract::OptionSide;
use super::errors::StatusCode;

/// Exchange placeholder matching every exchange.
pub const WILDCARD_EXCHANGE: &str = "*";

/// Reasons an alias cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
    /// Root base is empty.
    #[error("option root is empty")]
    EmptyRoot,

    /// Root base contains a reserved character.
    #[error("option root '{root}' contains reserved character '{reserved}'")]
    ReservedCharacter {
        /// Offending root.
        root: String,
        /// Reserved character found.
        reserved: char,
    },

    /// Strike must be positive.
    #[error("strike {strike} is not positive")]
    NonPositiveStrike {
        /// Offending strike.
        strike: Decimal,
    },

    /// Strike cannot be written as a fixed-width strike code.
    #[error("strike {strike} cannot be encoded in eight digits at 1/1000 precision")]
    StrikeNotEncodable {
        /// Offending strike.
        strike: Decimal,
    },

    /// Exchange code is empty.
    #[error("exchange code is empty")]
    EmptyExchange,
}

impl AliasError {
    /// Status code for this error.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        StatusCode::InvalidParameter
    }
}

/// Builds the alias of a single option contract.
///
/// `exchange` may be [`WILDCARD_EXCHANGE`] to match the contract on every
/// exchange.
pub trait AliasEncoder: Send + Sync {
    /// Encode a contract alias.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError`] if any component cannot be represented.
    fn build_alias(
        &self,
        root: &str,
        expiration: NaiveDate,
        side: OptionSide,
        strike: Decimal,
        exchange: &str,
    ) -> Result<String, AliasError>;
}
