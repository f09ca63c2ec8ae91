//! Option Roots and Reference Price

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::fields::{FieldError, FieldId, FieldList};

use super::errors::{PatternError, UniverseError};
use super::universe::{decode_expirations, decode_strikes};

// =============================================================================
// Root Symbol
// =============================================================================

/// An option root symbol split into base and exchange.
///
/// Gateway roots are listed as `BASE.EXCH`, e.g. `TWTR.O`. The split happens
/// at the last `.` so bases may themselves contain dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSymbol<'a> {
    base: &'a str,
    exchange: &'a str,
}

impl<'a> RootSymbol<'a> {
    /// Crack a root symbol.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRoot`] if the symbol has no `.`.
    pub fn crack(symbol: &'a str) -> Result<Self, PatternError> {
        symbol
            .rsplit_once('.')
            .map(|(base, exchange)| Self { base, exchange })
            .ok_or_else(|| PatternError::InvalidRoot {
                symbol: symbol.to_string(),
            })
    }

    /// Root base, e.g. `TWTR`.
    #[must_use]
    pub const fn base(&self) -> &'a str {
        self.base
    }

    /// Listing exchange of the root, e.g. `O`.
    #[must_use]
    pub const fn exchange(&self) -> &'a str {
        self.exchange
    }
}

// =============================================================================
// Option Root
// =============================================================================

/// An option root returned by root discovery.
///
/// Carries the raw field list of the root entry. The expiration and strike
/// universes are decoded only when asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRoot {
    symbol: String,
    fields: FieldList,
}

impl OptionRoot {
    /// Wrap a root discovery entry.
    pub fn new(symbol: impl Into<String>, fields: FieldList) -> Self {
        Self {
            symbol: symbol.into(),
            fields,
        }
    }

    /// Root symbol as listed (`BASE.EXCH`).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Crack the root symbol.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRoot`] if the symbol has no `.`.
    pub fn crack(&self) -> Result<RootSymbol<'_>, PatternError> {
        RootSymbol::crack(&self.symbol)
    }

    /// Raw field list of the root entry.
    #[must_use]
    pub const fn fields(&self) -> &FieldList {
        &self.fields
    }

    /// Expirations listed under the root. A root without the field lists
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError`] if the field has the wrong type or cannot
    /// be decoded.
    pub fn expiration_universe(&self) -> Result<BTreeSet<NaiveDate>, UniverseError> {
        match self.fields.binary_string(FieldId::EXPIRATION_DATE_LIST)? {
            Some(list) => decode_expirations(list),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Strikes listed under the root. A root without the field lists
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError`] if the field has the wrong type or cannot
    /// be decoded.
    pub fn strike_universe(&self) -> Result<BTreeSet<Decimal>, UniverseError> {
        match self.fields.blob(FieldId::STRIKE_PRICE_LIST)? {
            Some(blob) => decode_strikes(blob),
            None => Ok(BTreeSet::new()),
        }
    }
}

// =============================================================================
// Reference Price
// =============================================================================

/// Price of the underlying used for at-the-money and in-the-money decisions.
///
/// Zero means no price was available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReferencePrice(Decimal);

impl ReferencePrice {
    /// No reference price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a price.
    #[must_use]
    pub const fn new(price: Decimal) -> Self {
        Self(price)
    }

    /// Derive from the underlying's field list: last trade, else close,
    /// else zero.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] if trade or close holds a non-rational value.
    pub fn from_underlying(fields: &FieldList) -> Result<Self, FieldError> {
        if let Some(trade) = fields.rational(FieldId::TRADE)? {
            return Ok(Self(trade));
        }
        Ok(fields
            .rational(FieldId::CLOSE)?
            .map_or(Self::ZERO, Self))
    }

    /// Price value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Whether no price is available.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for ReferencePrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
