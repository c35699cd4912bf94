//! Line-oriented chat export parser.
//!
//! A message starts on a line shaped like
//! `1/5/24, 9:07 PM - Ada: text` (12-hour) or `05/01/2024, 21:07 - Ada: text`
//! (24-hour). Every other line continues the message above it.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use bandsite_shared::timestamp;
use bandsite_shared::{BandsiteError, RawMessage, Result};

static MESSAGE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{1,2}/\d{1,2}/\d{2,4}),\s(?P<time>\d{1,2}:\d{2})(?:\s?(?P<ampm>[APap][Mm]))?\s-\s(?P<author>[^:]+):\s(?P<text>.*)$",
    )
    .expect("valid regex")
});

/// Parse the raw text of an export into messages, in file order.
///
/// Fails with [`BandsiteError::MalformedTimestamp`] on the first message-start
/// line whose stamp no pattern accepts; the whole export is rejected because
/// every later stage depends on timestamp order.
#[instrument(skip_all, fields(bytes = raw.len()))]
pub fn parse_export(raw: &str) -> Result<Vec<RawMessage>> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut messages: Vec<RawMessage> = Vec::new();
    let mut current: Option<RawMessage> = None;
    let mut orphaned = 0usize;

    for (idx, line) in raw.lines().enumerate() {
        if let Some(caps) = MESSAGE_START_RE.captures(line) {
            let date = &caps["date"];
            let time = &caps["time"];
            let ampm = caps.name("ampm").map(|m| m.as_str());

            let ts = timestamp::parse_native(date, time, ampm).ok_or_else(|| {
                BandsiteError::MalformedTimestamp {
                    line: idx + 1,
                    value: match ampm {
                        Some(marker) => format!("{date}, {time} {marker}"),
                        None => format!("{date}, {time}"),
                    },
                }
            })?;

            if let Some(done) = current.take() {
                messages.push(done);
            }
            current = Some(RawMessage {
                id: None,
                ts,
                author: caps["author"].trim().to_string(),
                text: caps["text"].trim().to_string(),
            });
        } else if let Some(msg) = current.as_mut() {
            msg.text.push('\n');
            msg.text.push_str(line.trim());
        } else if !line.trim().is_empty() {
            orphaned += 1;
        }
    }

    if let Some(done) = current {
        messages.push(done);
    }

    if orphaned > 0 {
        warn!(
            lines = orphaned,
            "dropped continuation lines that precede the first message"
        );
    }
    debug!(messages = messages.len(), "export parsed");

    Ok(messages)
}

/// Read and parse an export file (UTF-8).
pub fn parse_export_file(path: &Path) -> Result<Vec<RawMessage>> {
    let raw = std::fs::read_to_string(path).map_err(|e| BandsiteError::io(path, e))?;
    parse_export(&raw)
}

/// Whether a line would open a new message.
pub fn is_message_start(line: &str) -> bool {
    MESSAGE_START_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    const EXPORT: &str = "\
1/5/24, 9:07 PM - Ada: Rehearsal Thursday?
1/5/24, 9:10 PM - Lin: Works for me
bring the new pedal
  and the spare cables
1/6/24, 10:00 AM - Cy Okafor: Booked room 4: 7pm
";

    #[test]
    fn parses_messages_and_continuations() {
        let messages = parse_export(EXPORT).expect("parse");
        assert_eq!(messages.len(), 3);

        assert_eq!(messages[0].author, "Ada");
        assert_eq!(messages[0].ts, at(2024, 1, 5, 21, 7));
        assert_eq!(messages[0].id, None);

        assert_eq!(
            messages[1].text,
            "Works for me\nbring the new pedal\nand the spare cables"
        );

        // Only the first colon separates author from text.
        assert_eq!(messages[2].author, "Cy Okafor");
        assert_eq!(messages[2].text, "Booked room 4: 7pm");
    }

    #[test]
    fn message_count_equals_start_lines() {
        let count = EXPORT.lines().filter(|l| is_message_start(l)).count();
        assert_eq!(parse_export(EXPORT).expect("parse").len(), count);
    }

    #[test]
    fn twenty_four_hour_and_four_digit_year() {
        let raw = "05/01/2024, 21:07 - Ada: late one\n5/2/2024, 7:30 am - Lin: early one";
        let messages = parse_export(raw).expect("parse");
        assert_eq!(messages[0].ts, at(2024, 5, 1, 21, 7));
        assert_eq!(messages[1].ts, at(2024, 5, 2, 7, 30));
    }

    #[test]
    fn ampm_without_space() {
        let messages = parse_export("1/5/24, 9:07PM - Ada: hi").expect("parse");
        assert_eq!(messages[0].ts, at(2024, 1, 5, 21, 7));
    }

    #[test]
    fn malformed_timestamp_aborts_whole_export() {
        let raw = "1/5/24, 9:07 PM - Ada: fine\n13/45/24, 9:00 - Lin: broken";
        match parse_export(raw) {
            Err(BandsiteError::MalformedTimestamp { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "13/45/24, 9:00");
            }
            other => panic!("expected MalformedTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn leading_continuation_is_dropped() {
        let raw = "Messages are end-to-end encrypted.\n1/5/24, 9:07 PM - Ada: hi";
        let messages = parse_export(raw).expect("parse");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
    }

    #[test]
    fn blank_continuation_lines_are_kept() {
        let raw = "1/5/24, 9:07 PM - Ada: first\n\nthird";
        let messages = parse_export(raw).expect("parse");
        assert_eq!(messages[0].text, "first\n\nthird");
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let raw = "\u{feff}1/5/24, 9:07 PM - Ada: hi\r\nsecond line\r\n";
        let messages = parse_export(raw).expect("parse");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi\nsecond line");
    }

    #[test]
    fn empty_export_yields_no_messages() {
        assert!(parse_export("").expect("parse").is_empty());
    }

    #[test]
    fn parse_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat.txt");
        std::fs::write(&path, EXPORT).expect("write");
        assert_eq!(parse_export_file(&path).expect("parse").len(), 3);
    }
}
