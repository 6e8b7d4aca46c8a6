//! Parser for server log lines
//!
//! Entries look like
//! `[2023-02-28 00:28:37,604] [INFO] [paperless.consumer] Consuming xyz.pdf`.
//! Lines not starting with such a header continue the previous entry.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ENTRY_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\[(?P<time>\d{4}-\d\d-\d\d\s+\d\d:\d\d:\d\d(?:[.,]\d{1,6})?)\]\s+",
        r"\[(?P<level>[A-Z]{1,20})\]\s+",
        r"\[(?P<module>[^\]]{1,64})\]\s?",
        r"(?P<message>.*)$",
    ))
    .expect("log entry pattern is valid")
});

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// One log entry, possibly spanning several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// `None` when the timestamp could not be interpreted
    pub time: Option<DateTime<FixedOffset>>,
    pub level: String,
    pub module: String,
    pub message: String,
}

/// Turns raw log lines into [`LogEntry`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct LogParser {
    timezone: Option<Tz>,
}

impl LogParser {
    /// Interpret timestamps in `timezone`, or the local timezone for `None`
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    /// Parse lines into entries. Lines before the first entry header are
    /// dropped.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = Vec::new();

        for line in lines {
            let line = line.as_ref().trim_end();

            if let Some(entry) = self.entry_start(line) {
                entries.push(entry);
            } else if let Some(current) = entries.last_mut() {
                current.message.push('\n');
                current.message.push_str(line);
            }
        }

        entries
    }

    fn entry_start(&self, line: &str) -> Option<LogEntry> {
        let caps = ENTRY_START.captures(line)?;

        Some(LogEntry {
            time: self.parse_time(&caps["time"]),
            level: caps["level"].to_string(),
            module: caps["module"].to_string(),
            message: caps["message"].to_string(),
        })
    }

    fn parse_time(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace(',', ".");

        let naive = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())?;

        match self.timezone {
            Some(tz) => localize(&tz, &naive),
            None => localize(&Local, &naive),
        }
    }
}

/// Attach `tz` to a wall-clock time, taking the earlier instant when the
/// time is ambiguous
pub(crate) fn localize<Z: TimeZone>(tz: &Z, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|time| time.fixed_offset())
}
