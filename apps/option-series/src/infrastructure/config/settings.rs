//! Option Series Configuration Settings
//!
//! Configuration for one resolution run, loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::fields::FieldId;
use crate::domain::option_series::{CallPut, Expansion, OptionSeriesFilter, StatusCode};

/// Underlying resolved when none is configured.
pub const DEFAULT_SYMBOL: &str = "TWTR";

/// Exchange list used when none is configured (composite).
pub const DEFAULT_EXCHANGES: &str = "Q";

/// Fields printed for each contract when none are configured.
pub const DEFAULT_FIELDS: [FieldId; 9] = [
    FieldId::SYMBOL,
    FieldId::EXPIRATION_DATE,
    FieldId::STRIKE_PRICE,
    FieldId::OPTION_TYPE,
    FieldId::TRADE,
    FieldId::BID,
    FieldId::ASK,
    FieldId::CUMULATIVE_VOLUME,
    FieldId::OPEN_INTEREST,
];

/// Complete run configuration.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    /// Gateway fixture to serve.
    pub fixture: PathBuf,
    /// Underlying symbol.
    pub symbol: String,
    /// Series filter.
    pub filter: OptionSeriesFilter,
    /// Fields returned for each contract.
    pub fields: Vec<FieldId>,
    /// Always expand filters into per-contract patterns.
    pub expand_patterns: bool,
    /// Print the Prometheus exposition after the run.
    pub print_metrics: bool,
}

impl SeriesConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture path is missing or any variable is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture path is missing or any variable is
    /// malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fixture = lookup("OPTION_SERIES_FIXTURE")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPTION_SERIES_FIXTURE".to_string()))?;
        if fixture.trim().is_empty() {
            return Err(ConfigError::EmptyValue("OPTION_SERIES_FIXTURE".to_string()));
        }

        let symbol = lookup("OPTION_SERIES_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
        if symbol.trim().is_empty() {
            return Err(ConfigError::EmptyValue("OPTION_SERIES_SYMBOL".to_string()));
        }

        let exchanges: Vec<String> = lookup("OPTION_SERIES_EXCHANGES")
            .unwrap_or_else(|| DEFAULT_EXCHANGES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();

        let mut filter = OptionSeriesFilter::new().with_exchanges(exchanges);

        if let Some(value) = lookup("OPTION_SERIES_CALL_PUT") {
            let call_put = CallPut::parse(&value).ok_or_else(|| invalid("OPTION_SERIES_CALL_PUT", &value))?;
            filter = filter.with_call_put(call_put);
        }
        if let Some(date) = parse_env::<NaiveDate>(&lookup, "OPTION_SERIES_START_DATE")? {
            filter = filter.with_start_date(date);
        }
        if let Some(date) = parse_env::<NaiveDate>(&lookup, "OPTION_SERIES_END_DATE")? {
            filter = filter.with_end_date(date);
        }
        if let Some(strike) = parse_env::<Decimal>(&lookup, "OPTION_SERIES_LOW_STRIKE")? {
            filter = filter.with_low_strike(strike);
        }
        if let Some(strike) = parse_env::<Decimal>(&lookup, "OPTION_SERIES_HIGH_STRIKE")? {
            filter = filter.with_high_strike(strike);
        }

        let at_the_money = parse_env_bool(&lookup, "OPTION_SERIES_AT_THE_MONEY", false)?;
        let range = parse_env::<Decimal>(&lookup, "OPTION_SERIES_AT_THE_MONEY_RANGE")?;
        if at_the_money {
            filter = match range {
                Some(range) => filter.with_at_the_money(range).map_err(|_| {
                    invalid("OPTION_SERIES_AT_THE_MONEY_RANGE", &range.to_string())
                })?,
                None => filter.with_at_the_money_flag(),
            };
        }

        let fields = match lookup("OPTION_SERIES_FIELDS") {
            Some(value) => parse_fields(&value)?,
            None => DEFAULT_FIELDS.to_vec(),
        };

        Ok(Self {
            fixture: PathBuf::from(fixture),
            symbol: symbol.trim().to_string(),
            filter,
            fields,
            expand_patterns: parse_env_bool(&lookup, "OPTION_SERIES_EXPAND_PATTERNS", false)?,
            print_metrics: parse_env_bool(&lookup, "OPTION_SERIES_PRINT_METRICS", false)?,
        })
    }

    /// Pattern expansion mode.
    #[must_use]
    pub const fn expansion(&self) -> Expansion {
        if self.expand_patterns {
            Expansion::Always
        } else {
            Expansion::Auto
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be parsed.
    #[error("environment variable {key} has invalid value '{value}'")]
    Invalid {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    /// Status code for this error.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        StatusCode::InvalidParameter
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_env<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|v| v.trim().parse().map_err(|_| invalid(key, &v)))
        .transpose()
}

fn parse_env_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, &value)),
    }
}

fn parse_fields(value: &str) -> Result<Vec<FieldId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| FieldId::from_name(name).ok_or_else(|| invalid("OPTION_SERIES_FIELDS", name)))
        .collect()
}
