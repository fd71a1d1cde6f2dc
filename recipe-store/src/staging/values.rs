//! Conversion of raw CSV fields into typed staging values

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

use recipe_types::ColumnType;

/// ISO-8601 duration: `P[nW][nD][T[nH][nM][nS]]`
static ISO_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("Failed to compile duration regex")
});

/// Clock duration: `HH:MM` or `HH:MM:SS`
static CLOCK_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2})(?::(\d{1,2}))?$").expect("Failed to compile clock regex")
});

/// Convert one CSV field. Empty fields are NULL for every type.
pub fn convert(column_type: ColumnType, raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    match column_type {
        ColumnType::Integer => parse_integer(raw).map(Value::Integer),
        ColumnType::Decimal { precision, scale } => {
            parse_decimal(raw, precision, scale).map(Value::Real)
        }
        ColumnType::Timestamp => parse_timestamp(raw)
            .map(|ts| Value::Text(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        ColumnType::Interval => parse_interval(raw).map(Value::Integer),
        ColumnType::Varchar(max) => {
            let len = raw.chars().count();
            if len > max as usize {
                Err(format!("value too long for VARCHAR({}) ({} characters)", max, len))
            } else {
                Ok(Value::Text(raw.to_string()))
            }
        }
        ColumnType::Text => Ok(Value::Text(raw.to_string())),
    }
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i32>()
        .map(i64::from)
        .map_err(|e| format!("invalid integer '{}': {}", raw, e))
}

fn parse_decimal(raw: &str, precision: u8, scale: u8) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid decimal '{}'", raw))?;
    if !value.is_finite() {
        return Err(format!("invalid decimal '{}'", raw));
    }

    let factor = 10f64.powi(scale as i32);
    let rounded = (value * factor).round() / factor;
    let limit = 10f64.powi(precision as i32 - scale as i32);
    if rounded.abs() >= limit {
        return Err(format!(
            "numeric overflow: '{}' does not fit DECIMAL({},{})",
            raw, precision, scale
        ));
    }
    Ok(rounded)
}

/// Parse a timestamp, taking values without an offset as UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let s = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(s, format) {
            return Ok(ts.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!("invalid timestamp '{}'", raw))
}

/// Parse a duration into whole seconds
pub fn parse_interval(raw: &str) -> Result<i64, String> {
    let s = raw.trim();
    let invalid = || format!("invalid interval '{}'", raw);

    if let Ok(seconds) = s.parse::<i64>() {
        return Ok(seconds);
    }

    let number = |m: Option<regex::Match>| -> Result<f64, String> {
        match m {
            Some(m) => m.as_str().parse::<f64>().map_err(|_| invalid()),
            None => Ok(0.0),
        }
    };

    if let Some(caps) = ISO_DURATION_REGEX.captures(s) {
        // A bare "P" or "PT" names no duration
        if s == "P" || s.ends_with('T') {
            return Err(invalid());
        }
        let seconds = number(caps.get(1))? * 604_800.0
            + number(caps.get(2))? * 86_400.0
            + number(caps.get(3))? * 3_600.0
            + number(caps.get(4))? * 60.0
            + number(caps.get(5))?;
        return Ok(seconds.round() as i64);
    }

    if let Some(caps) = CLOCK_DURATION_REGEX.captures(s) {
        let seconds =
            number(caps.get(1))? * 3_600.0 + number(caps.get(2))? * 60.0 + number(caps.get(3))?;
        return Ok(seconds as i64);
    }

    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_is_null_for_every_type() {
        for column_type in [
            ColumnType::Integer,
            ColumnType::Decimal { precision: 8, scale: 1 },
            ColumnType::Timestamp,
            ColumnType::Interval,
            ColumnType::Varchar(10),
            ColumnType::Text,
        ] {
            assert_eq!(convert(column_type, ""), Ok(Value::Null));
        }
    }

    #[test]
    fn test_integer() {
        assert_eq!(convert(ColumnType::Integer, " 42 "), Ok(Value::Integer(42)));
        assert!(convert(ColumnType::Integer, "4.5").is_err());
        assert!(convert(ColumnType::Integer, "NA").is_err());
        assert!(convert(ColumnType::Integer, "3000000000").is_err(), "INT is 32-bit");
    }

    #[test]
    fn test_decimal_rounds_to_scale() {
        let value = convert(ColumnType::Decimal { precision: 8, scale: 1 }, "170.94");
        assert_eq!(value, Ok(Value::Real(170.9)));
        let value = convert(ColumnType::Decimal { precision: 10, scale: 1 }, "38");
        assert_eq!(value, Ok(Value::Real(38.0)));
    }

    #[test]
    fn test_decimal_overflow() {
        assert!(convert(ColumnType::Decimal { precision: 3, scale: 1 }, "99.9").is_ok());
        assert!(convert(ColumnType::Decimal { precision: 3, scale: 1 }, "100").is_err());
        assert!(convert(ColumnType::Decimal { precision: 3, scale: 1 }, "inf").is_err());
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(1999, 8, 9, 21, 46, 0).unwrap();
        assert_eq!(parse_timestamp("1999-08-09T21:46:00Z"), Ok(expected));
        assert_eq!(parse_timestamp("1999-08-09 21:46:00"), Ok(expected));
        assert_eq!(parse_timestamp("1999-08-09 23:46:00+02:00"), Ok(expected));
        assert_eq!(
            parse_timestamp("1999-08-09"),
            Ok(Utc.with_ymd_and_hms(1999, 8, 9, 0, 0, 0).unwrap())
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_stored_as_utc_rfc3339() {
        assert_eq!(
            convert(ColumnType::Timestamp, "1999-08-09 23:46:00+02:00"),
            Ok(Value::Text("1999-08-09T21:46:00Z".to_string()))
        );
        assert_eq!(
            convert(ColumnType::Timestamp, "1999-08-09 21:46:00.5"),
            Ok(Value::Text("1999-08-09T21:46:00.500Z".to_string()))
        );
        let stored = match convert(ColumnType::Timestamp, "1999-08-09T21:46:00Z") {
            Ok(Value::Text(text)) => text,
            other => panic!("unexpected value: {other:?}"),
        };
        assert_eq!(
            stored.parse::<DateTime<Utc>>(),
            Ok(Utc.with_ymd_and_hms(1999, 8, 9, 21, 46, 0).unwrap())
        );
    }

    #[test]
    fn test_iso_intervals() {
        assert_eq!(parse_interval("PT24H45M"), Ok(24 * 3600 + 45 * 60));
        assert_eq!(parse_interval("PT30S"), Ok(30));
        assert_eq!(parse_interval("P1DT2H"), Ok(86_400 + 7_200));
        assert_eq!(parse_interval("P2W"), Ok(2 * 604_800));
        assert!(parse_interval("PT").is_err());
        assert!(parse_interval("P").is_err());
    }

    #[test]
    fn test_clock_and_numeric_intervals() {
        assert_eq!(parse_interval("01:30"), Ok(5_400));
        assert_eq!(parse_interval("00:00:45"), Ok(45));
        assert_eq!(parse_interval("90"), Ok(90));
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_varchar_limit() {
        assert!(convert(ColumnType::Varchar(10), "Female").is_ok());
        assert!(convert(ColumnType::Varchar(3), "abcd").is_err());
        // Characters, not bytes
        assert!(convert(ColumnType::Varchar(3), "äöü").is_ok());
    }

    #[test]
    fn test_text_verbatim() {
        assert_eq!(
            convert(ColumnType::Text, "  Mix, Bake  "),
            Ok(Value::Text("  Mix, Bake  ".to_string()))
        );
    }
}
