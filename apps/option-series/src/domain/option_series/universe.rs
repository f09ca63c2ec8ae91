//! Root Universe Codecs
//!
//! An option root advertises the expirations and strikes listed under it in
//! two compact fields:
//!
//! - `Strike Price List`: blob of 9 byte records, one scale byte followed by
//!   a big-endian `i64` mantissa.
//! - `Expiration Date List`: binary string of concatenated `YYYYMMDD` codes.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::errors::UniverseError;

/// Width of one strike record.
pub const STRIKE_RECORD_LEN: usize = 9;

/// Width of one expiration code.
pub const EXPIRATION_CODE_LEN: usize = 8;

const MAX_SCALE: u8 = 28;

/// Encode strikes into a strike list blob.
///
/// # Errors
///
/// Returns [`UniverseError::StrikeOutOfRange`] if a normalized mantissa does
/// not fit in an `i64`.
pub fn encode_strikes<'a>(
    strikes: impl IntoIterator<Item = &'a Decimal>,
) -> Result<Vec<u8>, UniverseError> {
    let mut out = Vec::new();
    for strike in strikes {
        let normalized = strike.normalize();
        let mantissa = i64::try_from(normalized.mantissa())
            .map_err(|_| UniverseError::StrikeOutOfRange { strike: *strike })?;
        out.push(u8::try_from(normalized.scale()).unwrap_or(MAX_SCALE));
        out.extend_from_slice(&mantissa.to_be_bytes());
    }
    Ok(out)
}

/// Decode a strike list blob.
///
/// # Errors
///
/// Returns [`UniverseError`] if the blob is truncated or a scale is out of
/// range.
pub fn decode_strikes(blob: &[u8]) -> Result<BTreeSet<Decimal>, UniverseError> {
    if blob.len() % STRIKE_RECORD_LEN != 0 {
        return Err(UniverseError::TruncatedStrikeList {
            len: blob.len(),
            record: STRIKE_RECORD_LEN,
        });
    }

    blob.chunks_exact(STRIKE_RECORD_LEN)
        .map(|record| {
            let scale = record[0];
            if scale > MAX_SCALE {
                return Err(UniverseError::InvalidScale { scale });
            }
            let mut mantissa = [0u8; 8];
            mantissa.copy_from_slice(&record[1..]);
            Ok(Decimal::new(i64::from_be_bytes(mantissa), u32::from(scale)).normalize())
        })
        .collect()
}

/// Encode expirations into an expiration list string.
#[must_use]
pub fn encode_expirations<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> String {
    dates
        .into_iter()
        .map(|date| date.format("%Y%m%d").to_string())
        .collect()
}

/// Decode an expiration list string.
///
/// # Errors
///
/// Returns [`UniverseError::InvalidExpiration`] for a short trailing code or
/// a code that is not a calendar date.
pub fn decode_expirations(list: &str) -> Result<BTreeSet<NaiveDate>, UniverseError> {
    let bytes = list.as_bytes();
    bytes
        .chunks(EXPIRATION_CODE_LEN)
        .map(|chunk| {
            let code = String::from_utf8_lossy(chunk);
            if chunk.len() != EXPIRATION_CODE_LEN {
                return Err(UniverseError::InvalidExpiration {
                    code: code.into_owned(),
                });
            }
            NaiveDate::parse_from_str(&code, "%Y%m%d").map_err(|_| {
                UniverseError::InvalidExpiration {
                    code: code.into_owned(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn strike_list_decodes_records() {
        let strikes = [dec!(40), dec!(42.5), dec!(0.25)];
        let blob = encode_strikes(&strikes).unwrap();
        assert_eq!(blob.len(), 3 * STRIKE_RECORD_LEN);

        let decoded = decode_strikes(&blob).unwrap();
        assert_eq!(
            decoded.into_iter().collect::<Vec<_>>(),
            vec![dec!(0.25), dec!(40), dec!(42.5)]
        );
    }

    #[test]
    fn strike_record_layout() {
        let blob = encode_strikes(&[dec!(42.5)]).unwrap();
        assert_eq!(blob[0], 1);
        assert_eq!(i64::from_be_bytes(blob[1..].try_into().unwrap()), 425);
    }

    #[test]
    fn strike_beyond_record_range_is_an_error() {
        let err = encode_strikes(&[dec!(40), Decimal::MAX]).unwrap_err();
        assert_eq!(err, UniverseError::StrikeOutOfRange { strike: Decimal::MAX });

        let widest = Decimal::from(i64::MAX);
        let blob = encode_strikes(&[widest]).unwrap();
        assert_eq!(decode_strikes(&blob).unwrap().into_iter().next(), Some(widest));
    }

    #[test]
    fn equal_strikes_with_different_scales_collapse() {
        let mut blob = vec![0u8];
        blob.extend_from_slice(&45i64.to_be_bytes());
        blob.push(2);
        blob.extend_from_slice(&4500i64.to_be_bytes());

        assert_eq!(decode_strikes(&blob).unwrap().len(), 1);
    }

    #[test]
    fn truncated_strike_list_rejected() {
        let err = decode_strikes(&[0, 0, 0]).unwrap_err();
        assert_eq!(err, UniverseError::TruncatedStrikeList { len: 3, record: 9 });
    }

    #[test]
    fn oversized_scale_rejected() {
        let mut blob = vec![40u8];
        blob.extend_from_slice(&1i64.to_be_bytes());
        assert_eq!(
            decode_strikes(&blob).unwrap_err(),
            UniverseError::InvalidScale { scale: 40 }
        );
    }

    #[test]
    fn expiration_list_decodes_codes() {
        let decoded = decode_expirations("2024021620240119").unwrap();
        let dates: Vec<_> = decoded.into_iter().collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
            ]
        );
    }

    #[test]
    fn empty_lists_decode_to_empty_sets() {
        assert!(decode_strikes(&[]).unwrap().is_empty());
        assert!(decode_expirations("").unwrap().is_empty());
    }

    #[test]
    fn malformed_expirations_rejected() {
        assert!(matches!(
            decode_expirations("2024011"),
            Err(UniverseError::InvalidExpiration { .. })
        ));
        assert_eq!(
            decode_expirations("20240230").unwrap_err(),
            UniverseError::InvalidExpiration {
                code: "20240230".to_string()
            }
        );
    }

    #[test]
    fn expiration_encoding_concatenates() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        ];
        assert_eq!(encode_expirations(&dates), "2024011920251231");
    }
}
