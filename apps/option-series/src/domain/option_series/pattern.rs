//! Search Pattern Builder
//!
//! Translates a filter into the search patterns for one option root.
//!
//! # Paths
//!
//! - **Fast**: the filter excludes nothing, so one wildcard pattern per
//!   exchange (`BASE/*.EXCH`, or `BASE/*` with no exchanges) retrieves every
//!   contract without decoding the root's universes.
//! - **Slow**: the root's expirations and strikes are filtered through the
//!   bound predicates and one alias is built per surviving
//!   `(expiration, strike, exchange, side)` combination, in that nesting
//!   order with calls before puts. A combination the alias encoder rejects
//!   is skipped and recorded on the plan; the rest of the root is kept.
//!
//! Both paths retrieve the same contracts whenever the fast path applies.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::alias::{AliasEncoder, AliasError, WILDCARD_EXCHANGE};
use super::bounds::{Rejection, check_expiration, check_strike};
use super::errors::PatternError;
use super::filter::OptionSeriesFilter;
use super::contract::OptionSide;
use super::root::{OptionRoot, ReferencePrice};

// =============================================================================
// Search Patterns
// =============================================================================

/// Gateway table a pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(u16);

impl TableId {
    /// North American equity option alias table.
    pub const EQUITY_OPTION_ALIAS: Self = Self(0x4f);

    /// Raw table number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

/// One symbol pattern for the pattern-match query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchPattern {
    /// Table to search.
    pub table: TableId,
    /// Symbol pattern, `*` matching any run of characters.
    pub pattern: String,
}

impl SearchPattern {
    /// Pattern against the option alias table.
    pub fn option_alias(pattern: impl Into<String>) -> Self {
        Self {
            table: TableId::EQUITY_OPTION_ALIAS,
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

// =============================================================================
// Plans
// =============================================================================

/// Which path produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternPath {
    /// Wildcard per exchange.
    Fast,
    /// Expanded per filtered combination.
    Slow,
}

impl PatternPath {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Slow => "slow",
        }
    }
}

/// A universe member the filter rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectedCandidate {
    /// Rejected expiration.
    Expiration(NaiveDate, Rejection),
    /// Rejected strike.
    Strike(Decimal, Rejection),
}

/// A surviving combination the alias encoder could not encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAlias {
    /// Expiration of the combination.
    pub expiration: NaiveDate,
    /// Strike of the combination.
    pub strike: Decimal,
    /// Side of the combination.
    pub side: OptionSide,
    /// Exchange code, or [`WILDCARD_EXCHANGE`].
    pub exchange: String,
    /// Encoder error.
    pub error: AliasError,
}

/// Patterns built for one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternPlan {
    /// Path taken.
    pub path: PatternPath,
    /// Patterns in emission order. Never empty.
    pub patterns: Vec<SearchPattern>,
    /// Universe members excluded by the filter (slow path only).
    pub rejected: Vec<RejectedCandidate>,
    /// Combinations dropped because no alias could be built (slow path only).
    pub skipped: Vec<SkippedAlias>,
}

/// When the slow path is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Fast path whenever the filter excludes nothing.
    #[default]
    Auto,
    /// Always expand.
    Always,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds search patterns for option roots.
#[derive(Debug, Clone)]
pub struct PatternBuilder<A> {
    encoder: A,
    expansion: Expansion,
}

impl<A: AliasEncoder> PatternBuilder<A> {
    /// Create a builder using `encoder` for slow path aliases.
    pub fn new(encoder: A) -> Self {
        Self {
            encoder,
            expansion: Expansion::default(),
        }
    }

    /// Set the expansion mode.
    #[must_use]
    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }

    /// Expansion mode in use.
    #[must_use]
    pub const fn expansion(&self) -> Expansion {
        self.expansion
    }

    /// Alias encoder in use.
    pub const fn encoder(&self) -> &A {
        &self.encoder
    }

    /// Build the patterns for one root.
    ///
    /// # Errors
    ///
    /// - [`PatternError::InvalidRoot`] if the root symbol has no exchange
    /// - [`PatternError::NoMatch`] if no pattern survives the filter
    /// - [`PatternError::Universe`] if the root's universes cannot be decoded
    /// - [`PatternError::Alias`] if the encoder rejects every surviving
    ///   combination (the first rejection is returned)
    pub fn build(
        &self,
        root: &OptionRoot,
        filter: &OptionSeriesFilter,
        reference_price: ReferencePrice,
    ) -> Result<PatternPlan, PatternError> {
        let cracked = root.crack()?;
        let base = cracked.base();

        if self.expansion == Expansion::Auto && filter.excludes_nothing() {
            return Ok(PatternPlan {
                path: PatternPath::Fast,
                patterns: fast_patterns(base, filter.exchanges()),
                rejected: Vec::new(),
                skipped: Vec::new(),
            });
        }

        let universe_error = |source| PatternError::Universe {
            root: base.to_string(),
            source,
        };
        let expirations = root.expiration_universe().map_err(universe_error)?;
        let strikes = root.strike_universe().map_err(universe_error)?;

        let mut rejected = Vec::new();
        let expirations: Vec<NaiveDate> = expirations
            .into_iter()
            .filter(|date| match check_expiration(*date, filter) {
                Ok(()) => true,
                Err(reason) => {
                    rejected.push(RejectedCandidate::Expiration(*date, reason));
                    false
                }
            })
            .collect();
        let strikes: Vec<Decimal> = strikes
            .into_iter()
            .filter(|strike| match check_strike(*strike, filter, reference_price.value()) {
                Ok(()) => true,
                Err(reason) => {
                    rejected.push(RejectedCandidate::Strike(*strike, reason));
                    false
                }
            })
            .collect();

        let wildcard = [WILDCARD_EXCHANGE.to_string()];
        let exchanges = if filter.exchanges().is_empty() {
            &wildcard[..]
        } else {
            filter.exchanges()
        };

        let mut patterns = Vec::new();
        let mut skipped = Vec::new();
        for expiration in &expirations {
            for strike in &strikes {
                for exchange in exchanges {
                    for side in filter.call_put().sides() {
                        match self.encoder.build_alias(base, *expiration, side, *strike, exchange) {
                            Ok(alias) => patterns.push(SearchPattern::option_alias(alias)),
                            Err(error) => skipped.push(SkippedAlias {
                                expiration: *expiration,
                                strike: *strike,
                                side,
                                exchange: exchange.clone(),
                                error,
                            }),
                        }
                    }
                }
            }
        }

        if patterns.is_empty() {
            return Err(skipped.into_iter().next().map_or_else(
                || PatternError::NoMatch {
                    root: base.to_string(),
                },
                |skip| PatternError::Alias(skip.error),
            ));
        }

        Ok(PatternPlan {
            path: PatternPath::Slow,
            patterns,
            rejected,
            skipped,
        })
    }
}

fn fast_patterns(base: &str, exchanges: &[String]) -> Vec<SearchPattern> {
    if exchanges.is_empty() {
        return vec![SearchPattern::option_alias(format!("{base}/*"))];
    }
    exchanges
        .iter()
        .map(|exchange| SearchPattern::option_alias(format!("{base}/*.{exchange}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::fields::{FieldId, FieldList, FieldValue};
    use crate::domain::option_series::bounds::{expiration_passes, strike_passes};
    use crate::domain::option_series::filter::CallPut;
    use crate::domain::option_series::universe::{encode_expirations, encode_strikes};

    /// Encodes each component verbatim so tests can read combinations back.
    #[derive(Debug, Clone, Copy)]
    struct PipeEncoder;

    impl AliasEncoder for PipeEncoder {
        fn build_alias(
            &self,
            root: &str,
            expiration: NaiveDate,
            side: OptionSide,
            strike: Decimal,
            exchange: &str,
        ) -> Result<String, AliasError> {
            Ok(format!("{root}|{expiration}|{side}|{strike}|{exchange}"))
        }
    }

    /// Rejects one strike and encodes the rest like [`PipeEncoder`].
    #[derive(Debug, Clone, Copy)]
    struct StrikeRejectingEncoder(Decimal);

    impl AliasEncoder for StrikeRejectingEncoder {
        fn build_alias(
            &self,
            root: &str,
            expiration: NaiveDate,
            side: OptionSide,
            strike: Decimal,
            exchange: &str,
        ) -> Result<String, AliasError> {
            if strike == self.0 {
                return Err(AliasError::StrikeNotEncodable { strike });
            }
            PipeEncoder.build_alias(root, expiration, side, strike, exchange)
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct RejectingEncoder;

    impl AliasEncoder for RejectingEncoder {
        fn build_alias(
            &self,
            _: &str,
            _: NaiveDate,
            _: OptionSide,
            strike: Decimal,
            _: &str,
        ) -> Result<String, AliasError> {
            Err(AliasError::NonPositiveStrike { strike })
        }
    }

    fn jan19() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    fn root(symbol: &str, expirations: &[NaiveDate], strikes: &[Decimal]) -> OptionRoot {
        OptionRoot::new(
            symbol,
            FieldList::new()
                .with(
                    FieldId::EXPIRATION_DATE_LIST,
                    FieldValue::BinaryString(encode_expirations(expirations)),
                )
                .with(
                    FieldId::STRIKE_PRICE_LIST,
                    FieldValue::Blob(encode_strikes(strikes).unwrap()),
                ),
        )
    }

    fn twtr() -> OptionRoot {
        root("TWTR.O", &[jan19()], &[dec!(40), dec!(45), dec!(50)])
    }

    fn pattern_strings(plan: &PatternPlan) -> Vec<&str> {
        plan.patterns.iter().map(|p| p.pattern.as_str()).collect()
    }

    #[test]
    fn fast_path_single_exchange() {
        let builder = PatternBuilder::new(PipeEncoder);
        let filter = OptionSeriesFilter::new().with_exchanges(["Q"]);

        let plan = builder.build(&twtr(), &filter, ReferencePrice::ZERO).unwrap();

        assert_eq!(plan.path, PatternPath::Fast);
        assert_eq!(pattern_strings(&plan), vec!["TWTR/*.Q"]);
        assert_eq!(plan.patterns[0].table, TableId::EQUITY_OPTION_ALIAS);
    }

    #[test]
    fn fast_path_without_exchanges_has_no_suffix() {
        let builder = PatternBuilder::new(PipeEncoder);
        let plan = builder
            .build(&twtr(), &OptionSeriesFilter::new(), ReferencePrice::ZERO)
            .unwrap();
        assert_eq!(pattern_strings(&plan), vec!["TWTR/*"]);
    }

    #[test]
    fn fast_path_never_decodes_universes() {
        let broken = OptionRoot::new(
            "TWTR.O",
            FieldList::new().with(FieldId::STRIKE_PRICE_LIST, FieldValue::Blob(vec![1, 2])),
        );
        let builder = PatternBuilder::new(PipeEncoder);
        let filter = OptionSeriesFilter::new().with_exchanges(["Q", "O"]);

        let plan = builder.build(&broken, &filter, ReferencePrice::ZERO).unwrap();
        assert_eq!(pattern_strings(&plan), vec!["TWTR/*.Q", "TWTR/*.O"]);
    }

    #[test]
    fn slow_path_strike_window_calls_only() {
        let builder = PatternBuilder::new(PipeEncoder);
        let filter = OptionSeriesFilter::new()
            .with_exchanges(["Q"])
            .with_low_strike(dec!(45))
            .with_high_strike(dec!(50))
            .with_call_put(CallPut::Call);

        let plan = builder.build(&twtr(), &filter, ReferencePrice::ZERO).unwrap();

        assert_eq!(plan.path, PatternPath::Slow);
        assert_eq!(
            pattern_strings(&plan),
            vec![
                "TWTR|2024-01-19|Call|45|Q",
                "TWTR|2024-01-19|Call|50|Q",
            ]
        );
        assert_eq!(
            plan.rejected,
            vec![RejectedCandidate::Strike(dec!(40), Rejection::BelowLowStrike)]
        );
    }

    #[test]
    fn slow_path_order_is_expiration_strike_exchange_side() {
        let feb16 = NaiveDate::from_ymd_opt(2024, 2, 16).unwrap();
        let root = root("TWTR.O", &[feb16, jan19()], &[dec!(50), dec!(45)]);
        let filter = OptionSeriesFilter::new()
            .with_exchanges(["Q", "O"])
            .with_low_strike(dec!(1));

        let plan = PatternBuilder::new(PipeEncoder)
            .build(&root, &filter, ReferencePrice::ZERO)
            .unwrap();

        assert_eq!(plan.patterns.len(), 2 * 2 * 2 * 2);
        assert_eq!(
            pattern_strings(&plan)[..5],
            [
                "TWTR|2024-01-19|Call|45|Q",
                "TWTR|2024-01-19|Put|45|Q",
                "TWTR|2024-01-19|Call|45|O",
                "TWTR|2024-01-19|Put|45|O",
                "TWTR|2024-01-19|Call|50|Q",
            ]
        );
        assert_eq!(
            plan.patterns.last().unwrap().pattern,
            "TWTR|2024-02-16|Put|50|O"
        );
    }

    #[test]
    fn slow_path_without_exchanges_uses_wildcard() {
        let filter = OptionSeriesFilter::new().with_call_put(CallPut::Put);
        let plan = PatternBuilder::new(PipeEncoder)
            .build(&twtr(), &filter, ReferencePrice::ZERO)
            .unwrap();

        assert_eq!(plan.patterns.len(), 3);
        assert!(plan.patterns.iter().all(|p| p.pattern.ends_with("|Put|40|*")
            || p.pattern.ends_with("|Put|45|*")
            || p.pattern.ends_with("|Put|50|*")));
    }

    #[test]
    fn at_the_money_narrows_strikes() {
        let filter = OptionSeriesFilter::new()
            .with_exchanges(["Q"])
            .with_at_the_money(dec!(2.5))
            .unwrap();
        let plan = PatternBuilder::new(PipeEncoder)
            .build(&twtr(), &filter, ReferencePrice::new(dec!(47.5)))
            .unwrap();

        assert_eq!(
            pattern_strings(&plan),
            vec![
                "TWTR|2024-01-19|Call|45|Q",
                "TWTR|2024-01-19|Put|45|Q",
                "TWTR|2024-01-19|Call|50|Q",
                "TWTR|2024-01-19|Put|50|Q",
            ]
        );
    }

    #[test]
    fn forced_expansion_takes_slow_path() {
        let builder = PatternBuilder::new(PipeEncoder).with_expansion(Expansion::Always);
        let filter = OptionSeriesFilter::new().with_exchanges(["Q"]);

        let plan = builder.build(&twtr(), &filter, ReferencePrice::ZERO).unwrap();

        assert_eq!(plan.path, PatternPath::Slow);
        assert_eq!(plan.patterns.len(), 3 * 2);
    }

    #[test]
    fn empty_result_is_no_match() {
        let filter = OptionSeriesFilter::new().with_low_strike(dec!(100));
        let err = PatternBuilder::new(PipeEncoder)
            .build(&twtr(), &filter, ReferencePrice::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            PatternError::NoMatch {
                root: "TWTR".to_string()
            }
        );
    }

    #[test]
    fn root_without_exchange_is_invalid() {
        let root = root("TWTR", &[jan19()], &[dec!(40)]);
        let err = PatternBuilder::new(PipeEncoder)
            .build(&root, &OptionSeriesFilter::new(), ReferencePrice::ZERO)
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidRoot { .. }));
    }

    #[test]
    fn corrupt_universe_is_reported() {
        let broken = OptionRoot::new(
            "TWTR.O",
            FieldList::new().with(FieldId::STRIKE_PRICE_LIST, FieldValue::Blob(vec![1, 2])),
        );
        let filter = OptionSeriesFilter::new().with_call_put(CallPut::Call);
        let err = PatternBuilder::new(PipeEncoder)
            .build(&broken, &filter, ReferencePrice::ZERO)
            .unwrap_err();
        assert!(matches!(err, PatternError::Universe { .. }));
    }

    #[test]
    fn unencodable_combination_is_skipped_and_the_rest_kept() {
        let filter = OptionSeriesFilter::new()
            .with_exchanges(["Q"])
            .with_call_put(CallPut::Call);
        let plan = PatternBuilder::new(StrikeRejectingEncoder(dec!(45)))
            .build(&twtr(), &filter, ReferencePrice::ZERO)
            .unwrap();

        assert_eq!(plan.path, PatternPath::Slow);
        assert_eq!(
            pattern_strings(&plan),
            vec!["TWTR|2024-01-19|Call|40|Q", "TWTR|2024-01-19|Call|50|Q"]
        );
        assert_eq!(
            plan.skipped,
            vec![SkippedAlias {
                expiration: jan19(),
                strike: dec!(45),
                side: OptionSide::Call,
                exchange: "Q".to_string(),
                error: AliasError::StrikeNotEncodable { strike: dec!(45) },
            }]
        );
    }

    #[test]
    fn encoder_rejecting_everything_is_propagated() {
        let filter = OptionSeriesFilter::new().with_call_put(CallPut::Call);
        let err = PatternBuilder::new(RejectingEncoder)
            .build(&twtr(), &filter, ReferencePrice::ZERO)
            .unwrap_err();
        assert!(matches!(err, PatternError::Alias(_)));
    }

    fn arb_filter() -> impl Strategy<Value = OptionSeriesFilter> {
        (
            proptest::option::of(0i64..200),
            proptest::option::of(0i64..200),
            proptest::option::of(1u32..28),
            proptest::option::of(1u32..28),
            prop_oneof![Just(CallPut::Call), Just(CallPut::Put), Just(CallPut::Both)],
            proptest::collection::vec("[A-Z]", 0..3),
            proptest::option::of(0i64..50),
        )
            .prop_map(|(low, high, start, end, call_put, exchanges, atm)| {
                let mut filter = OptionSeriesFilter::new()
                    .with_call_put(call_put)
                    .with_exchanges(exchanges);
                if let Some(low) = low {
                    filter = filter.with_low_strike(Decimal::from(low));
                }
                if let Some(high) = high {
                    filter = filter.with_high_strike(Decimal::from(high));
                }
                if let Some(day) = start {
                    filter = filter.with_start_date(NaiveDate::from_ymd_opt(2024, 1, day).unwrap());
                }
                if let Some(day) = end {
                    filter = filter.with_end_date(NaiveDate::from_ymd_opt(2024, 1, day).unwrap());
                }
                if let Some(range) = atm {
                    filter = filter.with_at_the_money(Decimal::from(range)).unwrap();
                }
                filter
            })
    }

    proptest! {
        #[test]
        fn slow_path_emits_exactly_passing_combinations(
            filter in arb_filter(),
            days in proptest::collection::btree_set(1u32..28, 0..5),
            strikes in proptest::collection::btree_set(1i64..200, 0..8),
            reference in 0i64..200,
        ) {
            let dates: Vec<_> = days
                .iter()
                .map(|d| NaiveDate::from_ymd_opt(2024, 1, *d).unwrap())
                .collect();
            let strikes: Vec<_> = strikes.iter().map(|s| Decimal::from(*s)).collect();
            let root = root("TWTR.O", &dates, &strikes);
            let reference = ReferencePrice::new(Decimal::from(reference));
            let builder = PatternBuilder::new(PipeEncoder).with_expansion(Expansion::Always);

            let exchanges: Vec<String> = if filter.exchanges().is_empty() {
                vec![WILDCARD_EXCHANGE.to_string()]
            } else {
                filter.exchanges().to_vec()
            };
            let mut expected = Vec::new();
            for date in dates.iter().filter(|d| expiration_passes(**d, &filter)) {
                for strike in strikes.iter().filter(|s| strike_passes(**s, &filter, reference.value())) {
                    for exchange in &exchanges {
                        for side in filter.call_put().sides() {
                            expected.push(format!("TWTR|{date}|{side}|{strike}|{exchange}"));
                        }
                    }
                }
            }

            match builder.build(&root, &filter, reference) {
                Ok(plan) => {
                    let emitted: Vec<String> =
                        plan.patterns.into_iter().map(|p| p.pattern).collect();
                    prop_assert_eq!(emitted, expected);
                }
                Err(PatternError::NoMatch { .. }) => prop_assert!(expected.is_empty()),
                Err(other) => {
                    return Err(TestCaseError::fail(format!("unexpected error: {other}")));
                }
            }
        }

        #[test]
        fn fast_path_count_matches_exchanges(
            exchanges in proptest::collection::vec("[A-Z]{1,2}", 0..6),
        ) {
            let filter = OptionSeriesFilter::new().with_exchanges(exchanges.clone());
            let plan = PatternBuilder::new(PipeEncoder)
                .build(&twtr(), &filter, ReferencePrice::ZERO)
                .unwrap();

            prop_assert_eq!(plan.path, PatternPath::Fast);
            prop_assert_eq!(plan.patterns.len(), exchanges.len().max(1));
            prop_assert!(plan.patterns.iter().all(|p| p.pattern.starts_with("TWTR/*")));
        }
    }
}
