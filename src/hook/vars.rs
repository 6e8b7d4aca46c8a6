//! Typed access to `DOCUMENT_*` variables

use crate::error::{Error, Result};
use crate::logs::localize;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::path::PathBuf;
use url::Url;

/// Timestamp layouts carrying an offset
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Wall-clock layouts, interpreted in the hook's timezone
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a hook timestamp.
///
/// Accepts RFC 3339, `2023-05-28 12:34:56+02:00` as written by the server,
/// and offset-less times down to a plain date. Times without an offset are
/// placed in `timezone`, or the local timezone for `None`.
pub fn parse_timestamp(value: &str, timezone: Option<Tz>) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time);
    }

    if let Some(time) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(time);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    match timezone {
        Some(tz) => localize(&tz, &naive),
        None => localize(&Local, &naive),
    }
}

/// Reads variables through a lookup function; empty values count as unset
pub(crate) struct HookVars<F> {
    lookup: F,
    timezone: Option<Tz>,
}

impl<F> HookVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub(crate) fn new(lookup: F, timezone: Option<Tz>) -> Self {
        Self { lookup, timezone }
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.is_empty())
    }

    pub(crate) fn string(&self, name: &str) -> String {
        self.get(name).unwrap_or_default()
    }

    pub(crate) fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).map(PathBuf::from)
    }

    pub(crate) fn int(&self, name: &str) -> Result<i64> {
        let Some(value) = self.get(name) else {
            return Ok(0);
        };

        value
            .trim()
            .parse()
            .map_err(|e| Error::hook_variable(name, value.clone(), format!("{e}")))
    }

    pub(crate) fn timestamp(&self, name: &str) -> Result<Option<DateTime<FixedOffset>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        parse_timestamp(&value, self.timezone)
            .map(Some)
            .ok_or_else(|| Error::hook_variable(name, value.clone(), "unrecognized timestamp"))
    }

    /// Absolute or server-relative URL, kept as written
    pub(crate) fn url(&self, name: &str) -> Result<Option<String>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        let base = Url::parse("http://localhost/")?;
        base.join(&value)
            .map_err(|e| Error::hook_variable(name, value.clone(), e.to_string()))?;

        Ok(Some(value))
    }

    /// Comma-separated list; blank items are dropped
    pub(crate) fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
