//! Log module
//!
//! Parses the log files exposed by the server's logs endpoint.

mod parser;

pub use parser::{LogEntry, LogParser};
pub(crate) use parser::localize;
