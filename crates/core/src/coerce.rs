//! Field-level coercion over loosely typed JSON objects.
//!
//! Every lookup takes a list of aliases and returns the first one that holds a
//! usable value of the requested type. Wrong types behave like absent fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn object<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Object> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_object))
}

pub fn array<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

pub fn string(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

pub fn non_empty_string(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| {
            obj.get(*k)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .map(str::to_string)
}

/// Finite numeric value, or `None`.
pub fn number(obj: &Object, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_f64).filter(|f| f.is_finite()))
}

/// Non-negative integer from the first alias holding a finite number.
/// Negative values clamp to 0 and fractions are truncated.
pub fn count(obj: &Object, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(count_value))
}

pub fn count_value(v: &Value) -> Option<u64> {
    let Value::Number(n) = v else {
        return None;
    };
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    let f = n.as_f64()?;
    if !f.is_finite() {
        return None;
    }
    Some(if f > 0.0 { f.trunc() as u64 } else { 0 })
}

/// Lowercased, trimmed string for case-insensitive enum matching.
pub fn label(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_ascii_lowercase())
}

/// Parses a calendar date or date-time. Years outside 1..=9999 are rejected
/// so the ISO rendering always parses back.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw).filter(|dt| (1..=9999).contains(&dt.year()))
}

fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // No zone information: assume UTC.
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First alias holding a parseable date, rendered as an ISO-8601 UTC string.
pub fn timestamp(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        obj.get(*k)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .map(format_timestamp)
    })
}

pub fn last_path_segment(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
