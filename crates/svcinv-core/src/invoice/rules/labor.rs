//! Labor extraction: hours with an optional hourly rate.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{LABOR_FIELD, LABOR_VALUE};
use crate::models::record::Labor;

/// Extract labor from a service block.
///
/// Labor markers are tried in preference order and the first one followed
/// by readable hours wins, so a "Labor Rate: $125/hr" line does not hide a
/// later "Labor: 1.5 hrs". Without readable hours the labor is absent.
pub fn extract_labor(text: &str) -> Option<Labor> {
    LABOR_FIELD
        .find_all(text)
        .iter()
        .find_map(|value| parse_labor(value))
}

/// Parse a labor value such as `0.75 hrs @ $125.50`.
pub fn parse_labor(value: &str) -> Option<Labor> {
    let caps = LABOR_VALUE.captures(value.trim_start())?;
    let hours = parse_decimal(caps.name("hours")?.as_str())?;
    let rate = caps.name("rate").and_then(|m| parse_decimal(m.as_str()));

    Some(Labor { hours, rate })
}

/// Parse a non-negative decimal, ignoring thousands commas.
fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned = s.replace(',', "");
    let normalized = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned
    };

    Decimal::from_str(&normalized)
        .ok()
        .filter(|d| !d.is_sign_negative())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_hours_and_rate() {
        assert_eq!(
            extract_labor("Labor: 0.75 hrs @ $125.50"),
            Some(Labor {
                hours: dec("0.75"),
                rate: Some(dec("125.50")),
            })
        );
    }

    #[test]
    fn test_hours_only() {
        assert_eq!(
            extract_labor("Labor: 1.25"),
            Some(Labor {
                hours: dec("1.25"),
                rate: None,
            })
        );
    }

    #[test]
    fn test_non_numeric_is_absent() {
        assert_eq!(extract_labor("Labor: abc"), None);
        assert_eq!(extract_labor("Labor: TBD @ $100"), None);
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(extract_labor("Parts: Oil filter"), None);
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(extract_labor("Labor: 2 hours").map(|l| l.hours), Some(dec("2")));
        assert_eq!(extract_labor("LABOR 3.5hrs").map(|l| l.hours), Some(dec("3.5")));
        assert_eq!(extract_labor("Labor: .5 hr").map(|l| l.hours), Some(dec("0.5")));
    }

    #[test]
    fn test_dollar_sign_as_rate_indicator() {
        let labor = extract_labor("Labor: 1.0 hrs $95.00/hr").unwrap();
        assert_eq!(labor.rate, Some(dec("95.00")));
    }

    #[test]
    fn test_rate_with_thousands_separator() {
        let labor = parse_labor("8 hrs @ $1,250.00").unwrap();
        assert_eq!(labor.hours, dec("8"));
        assert_eq!(labor.rate, Some(dec("1250.00")));
    }

    #[test]
    fn test_dangling_rate_indicator() {
        let labor = parse_labor("1.5 hrs @ TBD").unwrap();
        assert_eq!(labor.hours, dec("1.5"));
        assert_eq!(labor.rate, None);
    }

    #[test]
    fn test_skips_labor_markers_without_hours() {
        let block = "Complaint: Noise\nLabor Rate: $125/hr\nLabor: 1.5 hrs\n";
        assert_eq!(
            extract_labor(block),
            Some(Labor {
                hours: dec("1.5"),
                rate: None,
            })
        );

        let block = "Correction: Reduced labor time\nLabor: 2 hrs @ $110";
        assert_eq!(extract_labor(block).map(|l| l.rate), Some(Some(dec("110"))));
    }

    #[test]
    fn test_labor_in_block_context() {
        let block = "Complaint: Noise\nCorrection: Tightened belt\nLabor: 0.5 hrs @ $140\nParts: None";
        let labor = extract_labor(block).unwrap();
        assert_eq!(labor.hours, dec("0.5"));
        assert_eq!(labor.rate, Some(dec("140")));
    }
}
