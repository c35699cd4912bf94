//! Timestamp parsing for chat exports and message JSON.
//!
//! Exports use `M/D/YY, H:MM[ AM|PM]` style stamps in local wall-clock time;
//! message JSON uses ISO-8601. Both map onto [`NaiveDateTime`].

use chrono::{DateTime, NaiveDateTime};

/// Canonical serialized form (`2024-01-01T12:00:00`).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Export-native patterns, tried in order; the first successful parse wins.
const NATIVE_PATTERNS: [&str; 4] = [
    "%m/%d/%y, %I:%M %p",
    "%m/%d/%y, %H:%M",
    "%m/%d/%Y, %I:%M %p",
    "%m/%d/%Y, %H:%M",
];

const ISO_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse the date, time, and optional AM/PM captured from an export line.
pub fn parse_native(date: &str, time: &str, ampm: Option<&str>) -> Option<NaiveDateTime> {
    let stamp = match ampm {
        Some(marker) => format!("{date}, {time} {}", marker.to_ascii_uppercase()),
        None => format!("{date}, {time}"),
    };
    parse_native_stamp(&stamp)
}

fn parse_native_stamp(stamp: &str) -> Option<NaiveDateTime> {
    NATIVE_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(stamp, pattern).ok())
}

/// Parse any timestamp form accepted in message JSON.
///
/// Offsets in RFC 3339 input are dropped in favour of the wall-clock time,
/// which is what an export would have shown.
pub fn parse_flexible(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ISO_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| parse_native_stamp(&value.to_ascii_uppercase()))
}

/// Render a timestamp in the canonical form.
pub fn format_iso(ts: &NaiveDateTime) -> String {
    ts.format(ISO_FORMAT).to_string()
}

/// `#[serde(with = ...)]` adapter: canonical on output, flexible on input.
pub mod serde_ts {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_flexible(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp {raw:?}")))
    }
}
