//! Slash-Delimited Option Aliases
//!
//! Aliases take the form `ROOT/YYMDD/STRIKE.EXCH`:
//!
//! - `YY`: two digit expiration year
//! - `M`: month code, `A`-`L` for calls and `M`-`X` for puts
//! - `DD`: two digit expiration day
//! - `STRIKE`: strike times 1000, zero padded to eight digits (`00045000`,
//!   `00042500`)
//! - `EXCH`: exchange code, or `*` for every exchange
//!
//! ```text
//! TWTR/24A19/00045000.Q    TWTR Jan 19 2024 45 call on Q
//! TWTR/24M19/00045000.*    TWTR Jan 19 2024 45 put on any exchange
//! ```

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::option_series::{AliasEncoder, AliasError, OptionSide};

const RESERVED: [char; 2] = ['/', '*'];

/// Largest strike code that fits in eight digits.
const MAX_STRIKE_CODE: u64 = 99_999_999;

/// Default alias encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlashAliasEncoder;

impl SlashAliasEncoder {
    /// Month code for a side and month (1-12).
    #[must_use]
    pub fn month_code(side: OptionSide, month: u32) -> char {
        let base = match side {
            OptionSide::Call => b'A',
            OptionSide::Put => b'M',
        };
        let offset = u8::try_from(month.clamp(1, 12) - 1).unwrap_or(0);
        char::from(base + offset)
    }

    /// Fixed-width strike code: strike times 1000 in eight digits.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::StrikeNotEncodable`] if the strike has more than
    /// three decimal places or does not fit in eight digits.
    pub fn strike_code(strike: Decimal) -> Result<String, AliasError> {
        let code = strike
            .checked_mul(Decimal::ONE_THOUSAND)
            .filter(|scaled| scaled.fract().is_zero())
            .and_then(|scaled| scaled.to_u64())
            .filter(|code| (1..=MAX_STRIKE_CODE).contains(code))
            .ok_or(AliasError::StrikeNotEncodable { strike })?;
        Ok(format!("{code:08}"))
    }
}

impl AliasEncoder for SlashAliasEncoder {
    fn build_alias(
        &self,
        root: &str,
        expiration: NaiveDate,
        side: OptionSide,
        strike: Decimal,
        exchange: &str,
    ) -> Result<String, AliasError> {
        if root.is_empty() {
            return Err(AliasError::EmptyRoot);
        }
        if let Some(reserved) = root.chars().find(|c| RESERVED.contains(c)) {
            return Err(AliasError::ReservedCharacter {
                root: root.to_string(),
                reserved,
            });
        }
        if strike <= Decimal::ZERO {
            return Err(AliasError::NonPositiveStrike { strike });
        }
        if exchange.is_empty() {
            return Err(AliasError::EmptyExchange);
        }

        let strike = Self::strike_code(strike)?;

        Ok(format!(
            "{root}/{:02}{}{:02}/{strike}.{exchange}",
            expiration.year().rem_euclid(100),
            Self::month_code(side, expiration.month()),
            expiration.day(),
        ))
    }
}
