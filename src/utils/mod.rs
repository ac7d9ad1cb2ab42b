use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

const TRUTHY: &[&str] = &["true", "t", "1", "yes"];

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date. Anything else is `None`.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = non_empty(value)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Parse a game timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (the export format), the `T`-separated
/// variant, RFC 3339 with an offset (the offset is dropped, the wall clock is
/// kept) and a bare date, which is read as midnight.
pub fn parse_datetime(value: Option<&str>) -> Option<NaiveDateTime> {
    let value = non_empty(value)?;
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse an integer, truncating a decimal representation ("12.0" -> 12).
///
/// With `max` set, values above it become `None` instead of being clamped.
pub fn parse_int(value: Option<&str>, max: Option<i64>) -> Option<i64> {
    let value = non_empty(value)?;
    let parsed = match value.parse::<i64>() {
        Ok(int) => int,
        Err(_) => {
            let float = value.parse::<f64>().ok().filter(|f| f.is_finite())?;
            let truncated = float.trunc();
            if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
                return None;
            }
            truncated as i64
        }
    };
    match max {
        Some(max) if parsed > max => None,
        _ => Some(parsed),
    }
}

/// Parse a finite float. `NaN` and infinities are treated as malformed.
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    non_empty(value)?.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// `true`, `t`, `1`, `yes` in any case are true; everything else is false.
pub fn parse_bool(value: Option<&str>) -> bool {
    non_empty(value)
        .map(|v| TRUTHY.iter().any(|t| v.eq_ignore_ascii_case(t)))
        .unwrap_or(false)
}

/// Join name parts with single spaces, ignoring blank parts.
///
/// This is the canonical key used to match players ("first last") and teams
/// ("city mascot") across files.
pub fn canonical_name(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sum divided by games. Zero games yields zero rather than NaN.
pub fn per_game(total: f64, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    total / games as f64
}

/// Fraction of games won, in `[0, 1]`.
pub fn win_percentage(wins: u32, losses: u32) -> f64 {
    per_game(wins as f64, wins + losses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date() {
        let date = parse_date(Some("1984-12-30")).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1984, 12, 30));
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("12/30/1984")), None);
        assert_eq!(parse_date(Some("1984-13-01")), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let dt = parse_datetime(Some("2024-01-15 19:30:00")).unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (1, 15, 19));

        let dt = parse_datetime(Some("2024-01-15T19:30:00")).unwrap();
        assert_eq!(dt.minute(), 30);

        let dt = parse_datetime(Some("2024-01-15T19:30:00-05:00")).unwrap();
        assert_eq!(dt.hour(), 19);

        let dt = parse_datetime(Some("2023-10-01")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.hour()), (2023, 10, 0));
    }

    #[test]
    fn test_parse_datetime_malformed() {
        for input in ["", "   ", "yesterday", "2024-02-30 10:00:00", "15/01/2024"] {
            assert_eq!(parse_datetime(Some(input)), None, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(Some("42"), None), Some(42));
        assert_eq!(parse_int(Some(" 7 "), None), Some(7));
        assert_eq!(parse_int(Some("12.9"), None), Some(12));
        assert_eq!(parse_int(Some("-3"), None), Some(-3));
        assert_eq!(parse_int(Some("abc"), None), None);
        assert_eq!(parse_int(Some("NaN"), None), None);
        assert_eq!(parse_int(Some("inf"), None), None);
        assert_eq!(parse_int(Some("1e300"), None), None);
        assert_eq!(parse_int(Some(""), None), None);
        assert_eq!(parse_int(None, None), None);
    }

    #[test]
    fn test_parse_int_upper_bound() {
        assert_eq!(parse_int(Some("250"), Some(500)), Some(250));
        assert_eq!(parse_int(Some("500"), Some(500)), Some(500));
        assert_eq!(parse_int(Some("9999"), Some(500)), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some("31.5")), Some(31.5));
        assert_eq!(parse_float(Some("12")), Some(12.0));
        assert_eq!(parse_float(Some("nan")), None);
        assert_eq!(parse_float(Some("12:30")), None);
        assert_eq!(parse_float(None), None);
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "t", "T", "1", "yes", "Yes"] {
            assert!(parse_bool(Some(truthy)), "input {truthy:?}");
        }
        for falsy in ["false", "0", "no", "", "y", "2"] {
            assert!(!parse_bool(Some(falsy)), "input {falsy:?}");
        }
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name(&["LeBron", "James"]), "LeBron James");
        assert_eq!(canonical_name(&[" Los Angeles ", "Lakers "]), "Los Angeles Lakers");
        assert_eq!(canonical_name(&["", "Nene"]), "Nene");
        assert_eq!(canonical_name(&["", ""]), "");
    }

    #[test]
    fn test_win_percentage() {
        assert_eq!(win_percentage(3, 1), 0.75);
        assert_eq!(win_percentage(0, 0), 0.0);
    }
}
