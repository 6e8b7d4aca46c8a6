// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # paperhooks
//!
//! Resilient operations for the Paperless-ngx REST API.
//!
//! ## Features
//!
//! - **Whole-collection listing**: Pages are prefetched while items are
//!   handled, duplicates caused by concurrent edits are dropped and pages
//!   vanishing mid-iteration end the listing cleanly
//! - **Concurrency limiting**: A counting gate bounds requests in flight
//! - **Task waiting**: Exponential backoff polling, retrying server errors only
//! - **Cancellation**: Every operation observes a shared
//!   [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - **Logs**: Server log files parsed into structured entries
//! - **Hooks**: Typed access to the environment of consumption scripts
//! - **Documents**: Upload returning the consumption task ID, and downloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paperhooks::{ClientConfig, Result, WaitPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientConfig::from_env()?.build()?;
//!     let cancel = CancellationToken::new();
//!
//!     client.ping(&cancel).await?;
//!
//!     let task = client
//!         .wait_for_task("2e84c704-8762-4499-b144-29673844a2c1", WaitPolicy::default(), &cancel)
//!         .await?;
//!     println!("{:?}", task.result);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             Client                              │
//! │   list / list_all / get / create / update / patch / delete      │
//! │   list_tasks / get_task / wait_for_task   list_logs / get_log   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬──────────────┬──────────┐
//! │  Pagination  │         Task          │     HTTP     │   Auth   │
//! ├──────────────┼───────────────────────┼──────────────┼──────────┤
//! │ Cursor       │ TaskWaiter            │ HttpClient   │ Token    │
//! │ list_all     │ Backoff               │ Governor     │ Basic    │
//! └──────────────┴───────────────────────┴──────────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Authentication
pub mod auth;

/// HTTP client with concurrency limiting
pub mod http;

/// Page cursors and whole-collection listing
pub mod pagination;

/// Task model and completion polling
pub mod task;

/// Log entry parsing
pub mod logs;

/// Pre- and post-consumption hook environment
pub mod hook;

/// API client
pub mod client;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, ResultExt};

// Re-export commonly used types
pub use client::{Client, ListOptions, Resource};
pub use config::ClientConfig;
pub use hook::{PostConsume, PreConsume};
pub use http::ConcurrencyGovernor;
pub use pagination::{list_all, Cursor, Page, PageFetcher};
pub use task::{Task, TaskStatus, WaitPolicy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
