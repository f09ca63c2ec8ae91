//! Option Contract Classification
//!
//! Turns one pattern-match response entry into an [`OptionInfo`]: the
//! option side, strike and expiration read from their typed fields, every
//! other defined field carried through for display, and the in-the-money
//! flag computed against the resolution's reference price.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::fields::{FieldError, FieldId, FieldList, FieldValue};

use super::root::ReferencePrice;

/// Enumeration code carried by the option type field for calls.
pub const OPTION_TYPE_CALL: u8 = 0;

/// Enumeration code carried by the option type field for puts.
pub const OPTION_TYPE_PUT: u8 = 1;

/// Option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionSide {
    /// Decode from the option type enumeration code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            OPTION_TYPE_CALL => Some(Self::Call),
            OPTION_TYPE_PUT => Some(Self::Put),
            _ => None,
        }
    }

    /// Option type enumeration code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Call => OPTION_TYPE_CALL,
            Self::Put => OPTION_TYPE_PUT,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Put => "Put",
        }
    }

    /// Whether an option on this side with `strike` is in the money at
    /// `reference`. Equality is never in the money.
    #[must_use]
    pub fn in_the_money(self, strike: Decimal, reference: Decimal) -> bool {
        match self {
            Self::Call => reference > strike,
            Self::Put => reference < strike,
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified option contract.
///
/// Built once per valid response entry and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionInfo {
    symbol: String,
    side: OptionSide,
    strike: Option<Decimal>,
    expiration: Option<NaiveDate>,
    reference_price: Decimal,
    in_the_money: bool,
    fields: BTreeMap<FieldId, FieldValue>,
}

impl OptionInfo {
    /// Response key (contract alias).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Call or put.
    #[must_use]
    pub const fn side(&self) -> OptionSide {
        self.side
    }

    /// Strike price, if the entry carried one.
    #[must_use]
    pub const fn strike(&self) -> Option<Decimal> {
        self.strike
    }

    /// Expiration date, if the entry carried one.
    #[must_use]
    pub const fn expiration(&self) -> Option<NaiveDate> {
        self.expiration
    }

    /// Reference price the contract was classified against (zero if none).
    #[must_use]
    pub const fn reference_price(&self) -> Decimal {
        self.reference_price
    }

    /// Whether the contract is in the money. Always false without a
    /// reference price or strike.
    #[must_use]
    pub const fn in_the_money(&self) -> bool {
        self.in_the_money
    }

    /// Every defined field returned for the contract.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<FieldId, FieldValue> {
        &self.fields
    }

    /// Value of a single returned field.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&FieldValue> {
        self.fields.get(&id)
    }
}

impl fmt::Display for OptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.side)?;
        for (i, (id, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id} : {value}")?;
        }
        if !self.reference_price.is_zero() {
            if self.in_the_money {
                f.write_str(" is in the money.")?;
            } else {
                f.write_str(" is out of the money.")?;
            }
        }
        Ok(())
    }
}

/// Classify one response entry.
///
/// # Errors
///
/// Returns [`FieldError`] if the option type is missing or not a known
/// code, or if the strike or expiration field holds the wrong type.
pub fn classify(
    symbol: impl Into<String>,
    fields: &FieldList,
    reference_price: ReferencePrice,
) -> Result<OptionInfo, FieldError> {
    let code = fields
        .enumeration(FieldId::OPTION_TYPE)?
        .ok_or_else(|| FieldError::Malformed {
            field: FieldId::OPTION_TYPE,
            message: "option type not defined".to_string(),
        })?;
    let side = OptionSide::from_code(code).ok_or_else(|| FieldError::Malformed {
        field: FieldId::OPTION_TYPE,
        message: format!("unknown option type code {code}"),
    })?;

    let strike = fields.rational(FieldId::STRIKE_PRICE)?;
    let expiration = fields.date(FieldId::EXPIRATION_DATE)?;

    let reference = reference_price.value();
    let in_the_money = match strike {
        Some(strike) if !reference_price.is_zero() => side.in_the_money(strike, reference),
        _ => false,
    };

    Ok(OptionInfo {
        symbol: symbol.into(),
        side,
        strike,
        expiration,
        reference_price: reference,
        in_the_money,
        fields: fields
            .defined()
            .map(|(id, value)| (id, value.clone()))
            .collect(),
    })
}
