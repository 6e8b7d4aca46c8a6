//! Error types for paperhooks
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::task::{Task, TaskStatus};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// The main error type for paperhooks
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Transport and Request Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} ({}): {message}", status_text(*status))]
    Request { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Parse Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Parsing {name:?} value {value:?}: {message}")]
    CursorParse {
        name: String,
        value: String,
        message: String,
    },

    #[error("Unrecognized task status {0:?}")]
    TaskStatusParse(String),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Invalid hook variable {name}={value:?}: {message}")]
    HookVariable {
        name: String,
        value: String,
        message: String,
    },

    // ============================================================================
    // Task Errors
    // ============================================================================
    /// The task reached a terminal status other than success. The final
    /// snapshot is attached.
    #[error("task {task_id:?} status is {status}{}", message_suffix(message))]
    TaskFailed {
        task_id: String,
        status: TaskStatus,
        message: String,
        task: Box<Task>,
    },

    #[error("Waiting for task {task_id:?} timed out after {elapsed:?}: {reason}")]
    WaitTimeout {
        task_id: String,
        elapsed: Duration,
        reason: String,
    },

    // ============================================================================
    // Cancellation
    // ============================================================================
    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a request error
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an error for a malformed hook environment variable
    pub fn hook_variable(
        name: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::HookVariable {
            name: name.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a task failure error from the final task snapshot.
    pub fn task_failed(task: Task) -> Self {
        Self::TaskFailed {
            task_id: task.task_id.clone(),
            status: task.status,
            message: task.result.clone().unwrap_or_default(),
            task: Box::new(task),
        }
    }

    /// HTTP status code associated with this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server reported a 5xx status. These are the only errors
    /// the task poller retries.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|s| (500..600).contains(&s))
    }

    /// Whether the server reported 404
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Whether this error is the result of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The failed task snapshot carried by [`Error::TaskFailed`]
    pub fn failed_task(&self) -> Option<&Task> {
        match self {
            Error::TaskFailed { task, .. } => Some(task),
            _ => None,
        }
    }
}

fn status_text(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

fn message_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

/// Result type alias for paperhooks
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
