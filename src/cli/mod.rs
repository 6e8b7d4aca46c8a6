//! CLI module
//!
//! Command-line interface for the Paperless-ngx API.
//!
//! # Commands
//!
//! - `ping` - Test whether the API is available
//! - `tags` - List all tags
//! - `tasks` - List all tasks
//! - `wait-task` - Wait for a task to finish
//! - `logs` - List log files or show log entries
//! - `status` - Show server health
//! - `whoami` - Show the authenticated user
//! - `upload` - Upload a document, optionally waiting for consumption
//! - `download` - Download a document file
//! - `post-consume` / `pre-consume` - Print a consumption script's environment

mod commands;
mod runner;

pub use commands::{Cli, Commands, DownloadVariant, OutputFormat};
pub use runner::Runner;
