//! Option Series Filter Value Object

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contract::OptionSide;

/// Which option sides a filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallPut {
    /// Calls only.
    Call,
    /// Puts only.
    Put,
    /// Calls and puts.
    #[default]
    Both,
}

impl CallPut {
    /// Parse from a case-insensitive string (`CALL`, `PUT`, `BOTH`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CALL" | "C" => Some(Self::Call),
            "PUT" | "P" => Some(Self::Put),
            "BOTH" | "ALL" => Some(Self::Both),
            _ => None,
        }
    }

    /// Whether this selection admits the given side.
    #[must_use]
    pub const fn allows(self, side: OptionSide) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Call, OptionSide::Call) | (Self::Put, OptionSide::Put)
        )
    }

    /// Sides admitted, calls first.
    pub fn sides(self) -> impl Iterator<Item = OptionSide> {
        [OptionSide::Call, OptionSide::Put]
            .into_iter()
            .filter(move |side| self.allows(*side))
    }

    /// Name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
            Self::Both => "BOTH",
        }
    }
}

/// Error building a filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// At-the-money range must not be negative.
    #[error("at-the-money range {range} is negative")]
    NegativeAtTheMoneyRange {
        /// Offending range.
        range: Decimal,
    },
}

/// Declarative selection over an underlying's option series.
///
/// Bounds are inclusive. Inverted bounds are accepted and simply select
/// nothing, since each endpoint is checked on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionSeriesFilter {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    low_strike: Option<Decimal>,
    high_strike: Option<Decimal>,
    call_put: CallPut,
    exchanges: Vec<String>,
    at_the_money: bool,
    at_the_money_range: Option<Decimal>,
}

impl OptionSeriesFilter {
    /// Filter that selects every series on every exchange.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest expiration to include.
    #[must_use]
    pub const fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Latest expiration to include.
    #[must_use]
    pub const fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Lowest strike to include.
    #[must_use]
    pub const fn with_low_strike(mut self, strike: Decimal) -> Self {
        self.low_strike = Some(strike);
        self
    }

    /// Highest strike to include.
    #[must_use]
    pub const fn with_high_strike(mut self, strike: Decimal) -> Self {
        self.high_strike = Some(strike);
        self
    }

    /// Restrict to calls, puts or both.
    #[must_use]
    pub const fn with_call_put(mut self, call_put: CallPut) -> Self {
        self.call_put = call_put;
        self
    }

    /// Restrict to the given exchanges, in order.
    #[must_use]
    pub fn with_exchanges<I, S>(mut self, exchanges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exchanges = exchanges.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only strikes near the reference price.
    ///
    /// A range of zero, or a missing reference price at resolution time,
    /// leaves strikes unfiltered by proximity.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NegativeAtTheMoneyRange`] if `range` is negative.
    pub fn with_at_the_money(mut self, range: Decimal) -> Result<Self, FilterError> {
        if range < Decimal::ZERO {
            return Err(FilterError::NegativeAtTheMoneyRange { range });
        }
        self.at_the_money = true;
        self.at_the_money_range = Some(range);
        Ok(self)
    }

    /// Request the reference price without a proximity range.
    #[must_use]
    pub const fn with_at_the_money_flag(mut self) -> Self {
        self.at_the_money = true;
        self
    }

    /// Earliest expiration.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Latest expiration.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Lowest strike.
    #[must_use]
    pub const fn low_strike(&self) -> Option<Decimal> {
        self.low_strike
    }

    /// Highest strike.
    #[must_use]
    pub const fn high_strike(&self) -> Option<Decimal> {
        self.high_strike
    }

    /// Side selection.
    #[must_use]
    pub const fn call_put(&self) -> CallPut {
        self.call_put
    }

    /// Exchange codes, possibly empty.
    #[must_use]
    pub fn exchanges(&self) -> &[String] {
        &self.exchanges
    }

    /// Whether at-the-money selection is requested.
    #[must_use]
    pub const fn at_the_money(&self) -> bool {
        self.at_the_money
    }

    /// Proximity range around the reference price.
    #[must_use]
    pub const fn at_the_money_range(&self) -> Option<Decimal> {
        self.at_the_money_range
    }

    /// Whether the filter can exclude any series of a root.
    ///
    /// When it cannot, every contract under the root is wanted and a single
    /// wildcard pattern per exchange retrieves them.
    #[must_use]
    pub const fn excludes_nothing(&self) -> bool {
        matches!(self.call_put, CallPut::Both)
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.low_strike.is_none()
            && self.high_strike.is_none()
            && !self.at_the_money
    }
}
