//! Date/time/datetime formats (spec §6.3). These three temporal scalars
//! are carried on the wire as strings; this module decides whether a
//! given string is a valid instance of one of them, under either the
//! RFC 3339 default or a `format` constraint. `timestamp` is carried as
//! an integer instead and is checked directly in `validator.rs` against
//! its `precision` digit-length band.

use chrono::{NaiveDate, NaiveTime};

use crate::schema::types::ScalarKind;

/// Checks `text` against `kind`'s wire format: `format` overrides the
/// RFC 3339 default when present (spec §6.3, the `format` constraint).
pub fn validate(kind: ScalarKind, text: &str, format: Option<&str>) -> bool {
    match format {
        Some(fmt) => validate_custom(kind, text, fmt),
        None => validate_default(kind, text),
    }
}

fn validate_default(kind: ScalarKind, text: &str) -> bool {
    match kind {
        ScalarKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        ScalarKind::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok()
            || NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok(),
        ScalarKind::DateTime => chrono::DateTime::parse_from_rfc3339(text).is_ok(),
        _ => false,
    }
}

fn validate_custom(kind: ScalarKind, text: &str, fmt: &str) -> bool {
    match kind {
        ScalarKind::Date => NaiveDate::parse_from_str(text, fmt).is_ok(),
        ScalarKind::Time => NaiveTime::parse_from_str(text, fmt).is_ok(),
        ScalarKind::DateTime => chrono::NaiveDateTime::parse_from_str(text, fmt).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ScalarKind::Date, "2024-01-15", true)]
    #[case(ScalarKind::Date, "not-a-date", false)]
    #[case(ScalarKind::Time, "13:45:00", true)]
    #[case(ScalarKind::DateTime, "2024-01-15T13:45:00Z", true)]
    #[case(ScalarKind::DateTime, "2024-01-15 13:45:00", false)]
    fn default_formats(#[case] kind: ScalarKind, #[case] text: &str, #[case] expected: bool) {
        assert_eq!(validate_default(kind, text), expected);
    }

    #[test]
    fn custom_format_overrides_default() {
        assert!(validate(ScalarKind::Date, "15/01/2024", Some("%d/%m/%Y")));
        assert!(!validate_default(ScalarKind::Date, "15/01/2024"));
    }
}
