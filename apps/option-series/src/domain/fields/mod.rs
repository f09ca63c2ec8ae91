//! Decoded Field Lists
//!
//! Typed view over the field lists returned by the market data gateway.
//! Every response entry carries its own owned [`FieldList`], so values read
//! from one entry can never be overwritten by decoding the next one.
//!
//! # Field States
//!
//! A requested field is either `NotDefined` (the gateway knows the field but
//! has no value for this record) or `Defined` with a typed [`FieldValue`].
//! Typed accessors distinguish three outcomes:
//!
//! - `Ok(None)`: field absent or not defined
//! - `Ok(Some(v))`: field defined with the expected type
//! - `Err(FieldError)`: field defined with an unexpected type or payload

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Field Identifiers
// =============================================================================

/// Gateway field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(u16);

impl FieldId {
    /// Instrument symbol.
    pub const SYMBOL: Self = Self(1);
    /// Last trade price.
    pub const TRADE: Self = Self(10);
    /// Previous close price.
    pub const CLOSE: Self = Self(11);
    /// Best bid.
    pub const BID: Self = Self(12);
    /// Best ask.
    pub const ASK: Self = Self(13);
    /// Cumulative session volume.
    pub const CUMULATIVE_VOLUME: Self = Self(14);
    /// Open interest.
    pub const OPEN_INTEREST: Self = Self(15);
    /// Option strike price.
    pub const STRIKE_PRICE: Self = Self(20);
    /// Option expiration date.
    pub const EXPIRATION_DATE: Self = Self(21);
    /// Option type (call or put).
    pub const OPTION_TYPE: Self = Self(22);
    /// Encoded list of strikes listed under an option root.
    pub const STRIKE_PRICE_LIST: Self = Self(30);
    /// Encoded list of expirations listed under an option root.
    pub const EXPIRATION_DATE_LIST: Self = Self(31);

    const KNOWN: [(Self, &'static str); 12] = [
        (Self::SYMBOL, "Symbol"),
        (Self::TRADE, "Trade"),
        (Self::CLOSE, "Close"),
        (Self::BID, "Bid"),
        (Self::ASK, "Ask"),
        (Self::CUMULATIVE_VOLUME, "Cumulative Volume"),
        (Self::OPEN_INTEREST, "Open Interest"),
        (Self::STRIKE_PRICE, "Strike Price"),
        (Self::EXPIRATION_DATE, "Expiration Date"),
        (Self::OPTION_TYPE, "Option Type"),
        (Self::STRIKE_PRICE_LIST, "Strike Price List"),
        (Self::EXPIRATION_DATE_LIST, "Expiration Date List"),
    ];

    /// Create a field id from its raw value.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw numeric id.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Universal field name, if this is a well-known field.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        Self::KNOWN
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, name)| *name)
    }

    /// Look up a well-known field by its universal name.
    ///
    /// Matching ignores case and treats `_` and `-` as spaces, so
    /// `"strike_price"`, `"Strike Price"` and `"STRIKE-PRICE"` are equal.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_name(name);
        Self::KNOWN
            .iter()
            .find(|(_, known)| normalize_name(known) == wanted)
            .map(|(id, _)| *id)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "Field {}", self.0),
        }
    }
}

// =============================================================================
// Field Values
// =============================================================================

/// A decoded, typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Exact decimal number (prices, strikes).
    Rational(Decimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Free text.
    Text(String),
    /// Compact ASCII-encoded payload.
    BinaryString(String),
    /// Opaque binary payload.
    Blob(Vec<u8>),
    /// Small enumerated code.
    Enumeration(u8),
    /// Signed integer (volumes, counts).
    Integer(i64),
}

impl FieldValue {
    /// Name of the value's type, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Rational(_) => "rational",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
            Self::BinaryString(_) => "binary_string",
            Self::Blob(_) => "blob",
            Self::Enumeration(_) => "enumeration",
            Self::Integer(_) => "integer",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) | Self::BinaryString(text) => write!(f, "{text}"),
            Self::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Enumeration(code) => write!(f, "{code}"),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// State of a single field in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    /// Field is known but carries no value for this record.
    NotDefined,
    /// Field carries a value.
    Defined(FieldValue),
}

/// Error reading a typed value out of a field list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Field is defined but holds a different type.
    #[error("field {field} has type {found}, expected {expected}")]
    TypeMismatch {
        /// Offending field.
        field: FieldId,
        /// Type the reader asked for.
        expected: &'static str,
        /// Type actually present.
        found: &'static str,
    },

    /// Field payload could not be interpreted.
    #[error("field {field} is malformed: {message}")]
    Malformed {
        /// Offending field.
        field: FieldId,
        /// Error details.
        message: String,
    },
}

// =============================================================================
// Field List
// =============================================================================

/// Owned set of decoded fields for one response entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    fields: BTreeMap<FieldId, FieldState>,
}

impl FieldList {
    /// Create an empty field list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`define`](Self::define).
    #[must_use]
    pub fn with(mut self, id: FieldId, value: FieldValue) -> Self {
        self.define(id, value);
        self
    }

    /// Set a field to a defined value, replacing any previous state.
    pub fn define(&mut self, id: FieldId, value: FieldValue) {
        self.fields.insert(id, FieldState::Defined(value));
    }

    /// Mark a field as present but not defined.
    pub fn mark_not_defined(&mut self, id: FieldId) {
        self.fields.insert(id, FieldState::NotDefined);
    }

    /// State of a field, if it is present at all.
    #[must_use]
    pub fn state(&self, id: FieldId) -> Option<&FieldState> {
        self.fields.get(&id)
    }

    /// Value of a field if it is defined.
    #[must_use]
    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        match self.fields.get(&id) {
            Some(FieldState::Defined(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether a field is defined.
    #[must_use]
    pub fn is_defined(&self, id: FieldId) -> bool {
        self.value(id).is_some()
    }

    /// Iterate over defined fields in id order.
    pub fn defined(&self) -> impl Iterator<Item = (FieldId, &FieldValue)> {
        self.fields.iter().filter_map(|(id, state)| match state {
            FieldState::Defined(value) => Some((*id, value)),
            FieldState::NotDefined => None,
        })
    }

    /// Number of fields present (defined or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Project onto the requested field ids.
    ///
    /// Requested fields missing from `self` come back as `NotDefined`, which
    /// is how the gateway reports a field it cannot supply.
    #[must_use]
    pub fn project(&self, requested: &[FieldId]) -> Self {
        let fields = requested
            .iter()
            .map(|id| {
                let state = self.fields.get(id).cloned().unwrap_or(FieldState::NotDefined);
                (*id, state)
            })
            .collect();
        Self { fields }
    }

    /// Read a rational field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the field holds another type.
    pub fn rational(&self, id: FieldId) -> Result<Option<Decimal>, FieldError> {
        match self.value(id) {
            None => Ok(None),
            Some(FieldValue::Rational(value)) => Ok(Some(*value)),
            Some(other) => Err(mismatch(id, "rational", other)),
        }
    }

    /// Read a date field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the field holds another type.
    pub fn date(&self, id: FieldId) -> Result<Option<NaiveDate>, FieldError> {
        match self.value(id) {
            None => Ok(None),
            Some(FieldValue::Date(date)) => Ok(Some(*date)),
            Some(other) => Err(mismatch(id, "date", other)),
        }
    }

    /// Read a blob field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the field holds another type.
    pub fn blob(&self, id: FieldId) -> Result<Option<&[u8]>, FieldError> {
        match self.value(id) {
            None => Ok(None),
            Some(FieldValue::Blob(bytes)) => Ok(Some(bytes.as_slice())),
            Some(other) => Err(mismatch(id, "blob", other)),
        }
    }

    /// Read a binary string field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the field holds another type.
    pub fn binary_string(&self, id: FieldId) -> Result<Option<&str>, FieldError> {
        match self.value(id) {
            None => Ok(None),
            Some(FieldValue::BinaryString(text)) => Ok(Some(text.as_str())),
            Some(other) => Err(mismatch(id, "binary_string", other)),
        }
    }

    /// Read an enumeration field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the field holds another type.
    pub fn enumeration(&self, id: FieldId) -> Result<Option<u8>, FieldError> {
        match self.value(id) {
            None => Ok(None),
            Some(FieldValue::Enumeration(code)) => Ok(Some(*code)),
            Some(other) => Err(mismatch(id, "enumeration", other)),
        }
    }
}

const fn mismatch(field: FieldId, expected: &'static str, found: &FieldValue) -> FieldError {
    FieldError::TypeMismatch {
        field,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_names_round_trip() {
        assert_eq!(FieldId::STRIKE_PRICE.name(), Some("Strike Price"));
        assert_eq!(FieldId::from_name("strike_price"), Some(FieldId::STRIKE_PRICE));
        assert_eq!(FieldId::from_name("  Open-Interest "), Some(FieldId::OPEN_INTEREST));
        assert_eq!(FieldId::from_name("nonsense"), None);
    }

    #[test]
    fn field_id_display_unknown() {
        assert_eq!(FieldId::new(999).to_string(), "Field 999");
        assert_eq!(FieldId::BID.to_string(), "Bid");
    }

    #[test]
    fn typed_accessors_distinguish_missing_and_mismatch() {
        let mut fields = FieldList::new()
            .with(FieldId::TRADE, FieldValue::Rational(Decimal::new(5525, 2)))
            .with(FieldId::SYMBOL, FieldValue::Text("TWTR".to_string()));
        fields.mark_not_defined(FieldId::CLOSE);

        assert_eq!(fields.rational(FieldId::TRADE), Ok(Some(Decimal::new(5525, 2))));
        assert_eq!(fields.rational(FieldId::CLOSE), Ok(None));
        assert_eq!(fields.rational(FieldId::BID), Ok(None));
        assert!(matches!(
            fields.rational(FieldId::SYMBOL),
            Err(FieldError::TypeMismatch { expected: "rational", found: "text", .. })
        ));
    }

    #[test]
    fn defined_skips_not_defined_entries() {
        let mut fields = FieldList::new().with(FieldId::BID, FieldValue::Integer(1));
        fields.mark_not_defined(FieldId::ASK);

        let ids: Vec<_> = fields.defined().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![FieldId::BID]);
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn project_fills_missing_as_not_defined() {
        let fields = FieldList::new()
            .with(FieldId::BID, FieldValue::Rational(Decimal::ONE))
            .with(FieldId::ASK, FieldValue::Rational(Decimal::TWO));

        let projected = fields.project(&[FieldId::BID, FieldId::OPEN_INTEREST]);

        assert_eq!(projected.len(), 2);
        assert!(projected.is_defined(FieldId::BID));
        assert_eq!(projected.state(FieldId::OPEN_INTEREST), Some(&FieldState::NotDefined));
        assert!(projected.state(FieldId::ASK).is_none());
    }

    #[test]
    fn field_value_serde_is_tagged() {
        let value = FieldValue::Rational(Decimal::new(45, 0));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"rational","value":"45"}"#);

        let parsed: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }
}
