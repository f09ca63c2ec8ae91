//! Gateway Fixtures
//!
//! JSON description of the records an [`InMemoryGateway`] serves.
//!
//! ```json
//! {
//!   "underlyings": [{ "symbol": "TWTR", "trade": "47.5", "close": "46" }],
//!   "roots": [{
//!     "symbol": "TWTR.O", "underlying": "TWTR",
//!     "expirations": ["2024-01-19"], "strikes": ["40", "45", "50"]
//!   }],
//!   "contracts": [{
//!     "root": "TWTR", "expiration": "2024-01-19", "side": "call",
//!     "strike": "45", "exchange": "Q",
//!     "fields": { "Bid": { "type": "rational", "value": "3.10" } }
//!   }]
//! }
//! ```
//!
//! Contract aliases are derived with the alias encoder, and the symbol,
//! strike, expiration and option type fields are filled in from the
//! contract's own description.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::in_memory::{InMemoryGateway, RootListing};
use crate::application::ports::GatewayError;
use crate::domain::fields::{FieldId, FieldList, FieldValue};
use crate::domain::option_series::{AliasEncoder, OptionSide};

/// Underlying record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlyingFixture {
    /// Underlying symbol.
    pub symbol: String,
    /// Last trade price.
    #[serde(default)]
    pub trade: Option<Decimal>,
    /// Previous close.
    #[serde(default)]
    pub close: Option<Decimal>,
}

/// Option root record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFixture {
    /// Root symbol (`BASE.EXCH`).
    pub symbol: String,
    /// Underlying the root belongs to.
    pub underlying: String,
    /// Listed expirations.
    #[serde(default)]
    pub expirations: BTreeSet<NaiveDate>,
    /// Listed strikes.
    #[serde(default)]
    pub strikes: BTreeSet<Decimal>,
}

/// Option contract record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFixture {
    /// Root base.
    pub root: String,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub side: OptionSide,
    /// Strike price.
    pub strike: Decimal,
    /// Exchange code.
    pub exchange: String,
    /// Extra fields keyed by universal field name or numeric id.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Complete gateway fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFixture {
    /// Underlying records.
    #[serde(default)]
    pub underlyings: Vec<UnderlyingFixture>,
    /// Option roots.
    #[serde(default)]
    pub roots: Vec<RootFixture>,
    /// Option contracts.
    #[serde(default)]
    pub contracts: Vec<ContractFixture>,
}

impl GatewayFixture {
    /// Parse a fixture from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Fixture`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(json).map_err(|e| GatewayError::Fixture {
            message: e.to_string(),
        })
    }

    /// Read a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Fixture`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| GatewayError::Fixture {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Build a gateway serving this fixture.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Fixture`] if a contract names an unknown field
    /// or cannot be encoded as an alias.
    pub fn into_gateway(self, encoder: &impl AliasEncoder) -> Result<InMemoryGateway, GatewayError> {
        let gateway = InMemoryGateway::new();

        for underlying in self.underlyings {
            let mut fields = FieldList::new();
            if let Some(trade) = underlying.trade {
                fields.define(FieldId::TRADE, FieldValue::Rational(trade));
            }
            if let Some(close) = underlying.close {
                fields.define(FieldId::CLOSE, FieldValue::Rational(close));
            }
            gateway.add_underlying(underlying.symbol, fields);
        }

        for root in self.roots {
            gateway.add_root(RootListing {
                symbol: root.symbol,
                underlying: root.underlying,
                expirations: root.expirations,
                strikes: root.strikes,
            });
        }

        for contract in self.contracts {
            let alias = encoder
                .build_alias(
                    &contract.root,
                    contract.expiration,
                    contract.side,
                    contract.strike,
                    &contract.exchange,
                )
                .map_err(|e| GatewayError::Fixture {
                    message: format!("contract under '{}': {e}", contract.root),
                })?;

            let mut fields = FieldList::new();
            for (name, value) in contract.fields {
                fields.define(resolve_field(&name)?, value);
            }
            fields.define(FieldId::SYMBOL, FieldValue::Text(alias.clone()));
            fields.define(FieldId::STRIKE_PRICE, FieldValue::Rational(contract.strike));
            fields.define(FieldId::EXPIRATION_DATE, FieldValue::Date(contract.expiration));
            fields.define(FieldId::OPTION_TYPE, FieldValue::Enumeration(contract.side.code()));

            gateway.add_contract(alias, fields);
        }

        Ok(gateway)
    }
}

fn resolve_field(name: &str) -> Result<FieldId, GatewayError> {
    FieldId::from_name(name)
        .or_else(|| name.trim().parse::<u16>().ok().map(FieldId::new))
        .ok_or_else(|| GatewayError::Fixture {
            message: format!("unknown field '{name}'"),
        })
}
