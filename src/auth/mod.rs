//! Authentication module
//!
//! Supports: Paperless API token, HTTP Basic

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
