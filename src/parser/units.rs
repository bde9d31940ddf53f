//! Suffix notation used by the ZFS tools (`96K`, `1.50T`, `0B`).
//!
//! Suffixes are decimal powers of 1000.

use crate::error::{ExporterError, Result};

/// Placeholder the tools print for values that do not apply to a row
pub const PLACEHOLDER: &str = "-";

fn multiplier(suffix: char) -> Option<f64> {
    match suffix {
        'B' => Some(1.0),
        'K' => Some(1e3),
        'M' => Some(1e6),
        'G' => Some(1e9),
        'T' => Some(1e12),
        'P' => Some(1e15),
        _ => None,
    }
}

/// Parse a number with an optional magnitude suffix into a plain value
///
/// The number itself follows `f64::from_str`, so a leading `+`, `inf` and `NaN`
/// are accepted.
///
/// ```
/// use zfs_exporter::parser::units::parse_suffixed;
///
/// assert_eq!(parse_suffixed("1.5K").unwrap(), 1500.0);
/// assert_eq!(parse_suffixed("1024").unwrap(), 1024.0);
/// assert!(parse_suffixed("bad").is_err());
/// ```
pub fn parse_suffixed(token: &str) -> Result<f64> {
    let invalid = || ExporterError::Parse {
        token: token.to_string(),
    };

    let last = token.chars().last().ok_or_else(invalid)?;
    let (number, factor) = match multiplier(last) {
        Some(factor) => (&token[..token.len() - last.len_utf8()], factor),
        None => (token, 1.0),
    };

    number
        .parse::<f64>()
        .map(|value| value * factor)
        .map_err(|_| invalid())
}

/// Like [`parse_suffixed`] but maps the `-` placeholder to `None`
pub fn parse_optional(token: &str) -> Result<Option<f64>> {
    if token == PLACEHOLDER {
        Ok(None)
    } else {
        parse_suffixed(token).map(Some)
    }
}
