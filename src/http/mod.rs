//! HTTP client module
//!
//! Provides the HTTP transport shared by all API calls.
//!
//! # Features
//!
//! - **Concurrency Limiting**: Counting admission gate on outbound requests
//! - **Cancellation**: Every request observes a [`CancellationToken`]
//! - **Error Conversion**: Non-success responses become typed request errors
//! - **Authentication**: Integration with auth module
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod client;
mod concurrency;

pub use client::{
    compact_json, error_from_response, read_json, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
    RequestConfig, ACCEPT_JSON_V2,
};
pub use concurrency::ConcurrencyGovernor;
