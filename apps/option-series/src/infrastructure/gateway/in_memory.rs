//! In-Memory Gateway
//!
//! Table-backed [`GatewayPort`] used by the binary (loaded from a fixture)
//! and by tests. It answers root and pattern-match queries the way the live
//! gateway does: request blocks in order, one `NotFound` entry for anything
//! that matched nothing, and only the requested fields on each entry.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use regex::Regex;
use rust_decimal::Decimal;

use crate::application::ports::{
    GatewayError, GatewayPort, PatternQuery, RelationshipId, RequestBlock, ResponseBlock,
    SymbolQuery,
};
use crate::domain::fields::{FieldId, FieldList, FieldValue};
use crate::domain::option_series::TableId;
use crate::domain::option_series::universe::{encode_expirations, encode_strikes};

/// An option root listed under an underlying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootListing {
    /// Root symbol (`BASE.EXCH`).
    pub symbol: String,
    /// Underlying the root belongs to.
    pub underlying: String,
    /// Listed expirations.
    pub expirations: BTreeSet<NaiveDate>,
    /// Listed strikes.
    pub strikes: BTreeSet<Decimal>,
}

impl RootListing {
    fn fields(&self) -> Result<FieldList, GatewayError> {
        let strikes = encode_strikes(&self.strikes).map_err(|e| GatewayError::Fixture {
            message: format!("option root '{}': {e}", self.symbol),
        })?;
        Ok(FieldList::new()
            .with(FieldId::STRIKE_PRICE_LIST, FieldValue::Blob(strikes))
            .with(
                FieldId::EXPIRATION_DATE_LIST,
                FieldValue::BinaryString(encode_expirations(&self.expirations)),
            ))
    }
}

#[derive(Debug, Default)]
struct Failures {
    root: Option<GatewayError>,
    pattern: Option<GatewayError>,
}

/// In-memory market data gateway.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    underlyings: RwLock<HashMap<String, FieldList>>,
    roots: RwLock<Vec<RootListing>>,
    contracts: RwLock<Vec<(String, FieldList)>>,
    failures: RwLock<Failures>,
    root_queries: RwLock<Vec<SymbolQuery>>,
    pattern_queries: RwLock<Vec<PatternQuery>>,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an underlying's own record.
    pub fn add_underlying(&self, symbol: impl Into<String>, fields: FieldList) {
        self.underlyings.write().insert(symbol.into(), fields);
    }

    /// List an option root under an underlying.
    pub fn add_root(&self, listing: RootListing) {
        self.roots.write().push(listing);
    }

    /// Add or replace a contract keyed by its alias.
    pub fn add_contract(&self, alias: impl Into<String>, fields: FieldList) {
        let alias = alias.into();
        let mut contracts = self.contracts.write();
        if let Some(existing) = contracts.iter_mut().find(|(key, _)| *key == alias) {
            existing.1 = fields;
        } else {
            contracts.push((alias, fields));
        }
    }

    /// Number of contracts held.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.contracts.read().len()
    }

    /// Make every subsequent root query fail with `error`.
    pub fn fail_root_queries(&self, error: GatewayError) {
        self.failures.write().root = Some(error);
    }

    /// Make every subsequent pattern-match query fail with `error`.
    pub fn fail_pattern_queries(&self, error: GatewayError) {
        self.failures.write().pattern = Some(error);
    }

    /// Root queries received so far.
    #[must_use]
    pub fn root_queries(&self) -> Vec<SymbolQuery> {
        self.root_queries.read().clone()
    }

    /// Pattern-match queries received so far.
    #[must_use]
    pub fn pattern_queries(&self) -> Vec<PatternQuery> {
        self.pattern_queries.read().clone()
    }

    fn answer_block(
        &self,
        symbol: &str,
        block: &RequestBlock,
    ) -> Result<Vec<ResponseBlock>, GatewayError> {
        match block.relationship {
            RelationshipId::None => Ok(match self.underlyings.read().get(symbol) {
                Some(fields) => vec![ResponseBlock::success(
                    RelationshipId::None,
                    symbol,
                    fields.project(&block.fields),
                )],
                None => vec![ResponseBlock::not_found(RelationshipId::None, symbol)],
            }),
            RelationshipId::OptionRoot => {
                let roots = self
                    .roots
                    .read()
                    .iter()
                    .filter(|root| root.underlying == symbol)
                    .map(|root| -> Result<ResponseBlock, GatewayError> {
                        Ok(ResponseBlock::success(
                            RelationshipId::OptionRoot,
                            root.symbol.as_str(),
                            root.fields()?.project(&block.fields),
                        ))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if roots.is_empty() {
                    Ok(vec![ResponseBlock::not_found(RelationshipId::OptionRoot, symbol)])
                } else {
                    Ok(roots)
                }
            }
        }
    }
}

/// Compile a `*` glob into an anchored regex.
///
/// # Errors
///
/// Returns [`GatewayError::Rejected`] if the pattern cannot be compiled.
pub fn compile_pattern(pattern: &str) -> Result<Regex, GatewayError> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$")).map_err(|e| GatewayError::Rejected {
        message: format!("invalid pattern '{pattern}': {e}"),
    })
}

#[async_trait]
impl GatewayPort for InMemoryGateway {
    async fn send_root_query(&self, query: &SymbolQuery) -> Result<Vec<ResponseBlock>, GatewayError> {
        self.root_queries.write().push(query.clone());
        if let Some(error) = self.failures.read().root.clone() {
            return Err(error);
        }

        let mut blocks = Vec::new();
        for block in &query.blocks {
            blocks.extend(self.answer_block(&query.symbol, block)?);
        }
        Ok(blocks)
    }

    async fn send_pattern_match_query(
        &self,
        query: &PatternQuery,
    ) -> Result<Vec<ResponseBlock>, GatewayError> {
        self.pattern_queries.write().push(query.clone());
        if let Some(error) = self.failures.read().pattern.clone() {
            return Err(error);
        }

        let contracts = self.contracts.read();
        let mut entries = Vec::new();
        for pattern in &query.patterns {
            if pattern.table != TableId::EQUITY_OPTION_ALIAS {
                entries.push(ResponseBlock::not_found(RelationshipId::None, pattern.pattern.as_str()));
                continue;
            }

            let regex = compile_pattern(&pattern.pattern)?;
            let before = entries.len();
            entries.extend(
                contracts
                    .iter()
                    .filter(|(alias, _)| regex.is_match(alias))
                    .map(|(alias, fields)| {
                        ResponseBlock::success(
                            RelationshipId::None,
                            alias.as_str(),
                            fields.project(&query.fields),
                        )
                    }),
            );
            if entries.len() == before {
                entries.push(ResponseBlock::not_found(RelationshipId::None, pattern.pattern.as_str()));
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;
    use crate::domain::option_series::SearchPattern;

    fn jan19() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    fn gateway() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        gateway.add_underlying(
            "TWTR",
            FieldList::new().with(FieldId::TRADE, FieldValue::Rational(dec!(47.5))),
        );
        gateway.add_root(RootListing {
            symbol: "TWTR.O".to_string(),
            underlying: "TWTR".to_string(),
            expirations: BTreeSet::from([jan19()]),
            strikes: BTreeSet::from([dec!(40), dec!(45)]),
        });
        for alias in ["TWTR/24A19/00040000.Q", "TWTR/24A19/00045000.Q", "TWTR/24M19/00045000.O"] {
            gateway.add_contract(
                alias,
                FieldList::new()
                    .with(FieldId::SYMBOL, FieldValue::Text(alias.to_string()))
                    .with(FieldId::BID, FieldValue::Rational(dec!(1.25))),
            );
        }
        gateway
    }

    fn pattern_query(patterns: &[&str], fields: Vec<FieldId>) -> PatternQuery {
        PatternQuery {
            patterns: patterns
                .iter()
                .map(|p| SearchPattern::option_alias(*p))
                .collect(),
            fields,
        }
    }

    #[test_case("TWTR/*", "TWTR/24A19/00045000.Q", true)]
    #[test_case("TWTR/*.Q", "TWTR/24A19/00045000.Q", true)]
    #[test_case("TWTR/*.Q", "TWTR/24A19/00045000.O", false)]
    #[test_case("TWTR/*", "TWTRX/24A19/00045000.Q", false)]
    #[test_case("TWTR/24A19/00045000.*", "TWTR/24A19/00045000.Q", true)]
    #[test_case("TWTR/24A19/00042000.*", "TWTR/24A19/00042500.Q", false)]
    fn glob_matching(pattern: &str, alias: &str, expected: bool) {
        assert_eq!(compile_pattern(pattern).unwrap().is_match(alias), expected);
    }

    #[tokio::test]
    async fn root_query_answers_blocks_in_order() {
        let gateway = gateway();
        let query = SymbolQuery {
            symbol: "TWTR".to_string(),
            blocks: vec![
                RequestBlock::new(
                    RelationshipId::OptionRoot,
                    vec![FieldId::STRIKE_PRICE_LIST, FieldId::EXPIRATION_DATE_LIST],
                ),
                RequestBlock::new(RelationshipId::None, vec![FieldId::TRADE, FieldId::CLOSE]),
            ],
        };

        let blocks = gateway.send_root_query(&query).await.unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].relationship, RelationshipId::OptionRoot);
        assert_eq!(blocks[0].symbol, "TWTR.O");
        assert!(blocks[0].fields.is_defined(FieldId::STRIKE_PRICE_LIST));
        assert_eq!(blocks[1].relationship, RelationshipId::None);
        assert_eq!(blocks[1].fields.rational(FieldId::TRADE), Ok(Some(dec!(47.5))));
        assert!(!blocks[1].fields.is_defined(FieldId::CLOSE));
        assert_eq!(gateway.root_queries(), vec![query]);
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let query = SymbolQuery {
            symbol: "NOPE".to_string(),
            blocks: vec![RequestBlock::new(RelationshipId::OptionRoot, vec![])],
        };
        let blocks = gateway().send_root_query(&query).await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].is_valid());
    }

    #[tokio::test]
    async fn pattern_query_projects_requested_fields() {
        let gateway = gateway();
        let query = pattern_query(&["TWTR/*.Q"], vec![FieldId::SYMBOL, FieldId::ASK]);

        let entries = gateway.send_pattern_match_query(&query).await.unwrap();

        let symbols: Vec<_> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TWTR/24A19/00040000.Q", "TWTR/24A19/00045000.Q"]);
        assert!(entries[0].fields.is_defined(FieldId::SYMBOL));
        assert!(!entries[0].fields.is_defined(FieldId::ASK));
        assert!(entries[0].fields.state(FieldId::BID).is_none());
    }

    #[tokio::test]
    async fn unmatched_pattern_yields_not_found_entry() {
        let query = pattern_query(&["TWTR/25A19/*", "TWTR/*.O"], vec![FieldId::SYMBOL]);
        let entries = gateway().send_pattern_match_query(&query).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_valid());
        assert_eq!(entries[0].symbol, "TWTR/25A19/*");
        assert_eq!(entries[1].symbol, "TWTR/24M19/00045000.O");
    }

    #[tokio::test]
    async fn unlistable_strike_fails_root_query() {
        let gateway = InMemoryGateway::new();
        gateway.add_root(RootListing {
            symbol: "HUGE.O".to_string(),
            underlying: "HUGE".to_string(),
            expirations: BTreeSet::from([jan19()]),
            strikes: BTreeSet::from([dec!(10), Decimal::MAX]),
        });
        let query = SymbolQuery {
            symbol: "HUGE".to_string(),
            blocks: vec![RequestBlock::new(RelationshipId::OptionRoot, vec![FieldId::STRIKE_PRICE_LIST])],
        };

        let err = gateway.send_root_query(&query).await.unwrap_err();

        assert!(matches!(err, GatewayError::Fixture { ref message } if message.contains("HUGE.O")));
    }

    #[tokio::test]
    async fn injected_failures_are_returned() {
        let gateway = gateway();
        gateway.fail_pattern_queries(GatewayError::Unavailable {
            message: "maintenance".to_string(),
        });

        let query = pattern_query(&["TWTR/*"], vec![]);
        let err = gateway.send_pattern_match_query(&query).await.unwrap_err();

        assert!(matches!(err, GatewayError::Unavailable { .. }));
        assert_eq!(gateway.pattern_queries().len(), 1);
    }

    #[test]
    fn add_contract_replaces_existing_alias() {
        let gateway = gateway();
        gateway.add_contract("TWTR/24A19/00040000.Q", FieldList::new());
        assert_eq!(gateway.contract_count(), 3);
    }
}
