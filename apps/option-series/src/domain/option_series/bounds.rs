//! Bound Filters
//!
//! Pure predicates deciding whether a candidate expiration or strike belongs
//! to a filter. Comparisons are inclusive at the bound values, and each
//! bound is checked independently so inverted bounds reject everything.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::errors::StatusCode;
use super::filter::OptionSeriesFilter;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Expiration after the end date.
    AfterEndDate,
    /// Expiration before the start date.
    BeforeStartDate,
    /// Strike above the high strike.
    AboveHighStrike,
    /// Strike below the low strike.
    BelowLowStrike,
    /// Strike farther from the reference price than the at-the-money range.
    OutsideAtTheMoneyRange,
}

impl Rejection {
    /// Status code carried by every rejection.
    #[must_use]
    pub const fn code(self) -> StatusCode {
        StatusCode::OutOfRange
    }

    /// Name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AfterEndDate => "after_end_date",
            Self::BeforeStartDate => "before_start_date",
            Self::AboveHighStrike => "above_high_strike",
            Self::BelowLowStrike => "below_low_strike",
            Self::OutsideAtTheMoneyRange => "outside_at_the_money_range",
        }
    }
}

/// Check an expiration date against the filter's date window.
///
/// # Errors
///
/// Returns the violated bound.
pub fn check_expiration(date: NaiveDate, filter: &OptionSeriesFilter) -> Result<(), Rejection> {
    if filter.end_date().is_some_and(|end| date > end) {
        return Err(Rejection::AfterEndDate);
    }
    if filter.start_date().is_some_and(|start| date < start) {
        return Err(Rejection::BeforeStartDate);
    }
    Ok(())
}

/// Check a strike against the filter's strike window and at-the-money range.
///
/// Proximity is only enforced when at-the-money is requested, the range is
/// nonzero and a reference price is known (nonzero).
///
/// # Errors
///
/// Returns the violated bound.
pub fn check_strike(
    strike: Decimal,
    filter: &OptionSeriesFilter,
    reference_price: Decimal,
) -> Result<(), Rejection> {
    if filter.high_strike().is_some_and(|high| strike > high) {
        return Err(Rejection::AboveHighStrike);
    }
    if filter.low_strike().is_some_and(|low| strike < low) {
        return Err(Rejection::BelowLowStrike);
    }
    if filter.at_the_money() && !reference_price.is_zero() {
        if let Some(range) = filter.at_the_money_range().filter(|r| !r.is_zero()) {
            if (strike - reference_price).abs() > range {
                return Err(Rejection::OutsideAtTheMoneyRange);
            }
        }
    }
    Ok(())
}

/// Whether an expiration date passes the filter.
#[must_use]
pub fn expiration_passes(date: NaiveDate, filter: &OptionSeriesFilter) -> bool {
    check_expiration(date, filter).is_ok()
}

/// Whether a strike passes the filter given the reference price.
#[must_use]
pub fn strike_passes(strike: Decimal, filter: &OptionSeriesFilter, reference_price: Decimal) -> bool {
    check_strike(strike, filter, reference_price).is_ok()
}
