//! Task model
//!
//! Paperless runs long operations such as document consumption as Celery
//! tasks and reports their state through the tasks endpoint.

use crate::error::Error;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Celery task state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    /// No status reported
    #[default]
    Unspecified,
    /// Waiting for execution
    Pending,
    /// Execution has started
    Started,
    /// Executed successfully
    Success,
    /// Execution resulted in failure
    Failure,
    /// Being retried
    Retry,
    /// Revoked
    Revoked,
}

impl TaskStatus {
    const WIRE: [(TaskStatus, &'static str); 6] = [
        (TaskStatus::Pending, "PENDING"),
        (TaskStatus::Started, "STARTED"),
        (TaskStatus::Success, "SUCCESS"),
        (TaskStatus::Failure, "FAILURE"),
        (TaskStatus::Retry, "RETRY"),
        (TaskStatus::Revoked, "REVOKED"),
    ];

    /// Wire representation; empty for [`TaskStatus::Unspecified`]
    pub fn as_str(&self) -> &'static str {
        Self::WIRE
            .iter()
            .find(|(status, _)| status == self)
            .map_or("", |(_, text)| text)
    }

    /// Whether the task finished permanently.
    ///
    /// [`TaskStatus::Unspecified`] counts as terminal, so a task whose status
    /// was never reported does not keep a waiter polling.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Unspecified | TaskStatus::Success | TaskStatus::Failure | TaskStatus::Revoked
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Unspecified => f.write_str("UNSPECIFIED"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    /// Case-insensitive; the empty string is [`TaskStatus::Unspecified`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(TaskStatus::Unspecified);
        }

        Self::WIRE
            .iter()
            .find(|(_, text)| text.eq_ignore_ascii_case(s))
            .map(|(status, _)| *status)
            .ok_or_else(|| Error::TaskStatusParse(s.to_string()))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Snapshot of a server-side task
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Internal ID
    pub id: i64,
    /// External (Celery) task ID
    pub task_id: String,
    /// Name of the file being processed, if any
    pub task_file_name: Option<String>,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub date_done: Option<DateTime<FixedOffset>>,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    /// Result message
    pub result: Option<String>,
    pub acknowledged: bool,
}

impl Task {
    /// Whether the task reached a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
