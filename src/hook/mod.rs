//! Consumption hooks
//!
//! Paperless-ngx can run a script before and after consuming a document and
//! describes the document in `DOCUMENT_*` environment variables. The types
//! here read those variables.
//!
//! # Example
//!
//! ```no_run
//! use paperhooks::hook::PostConsume;
//!
//! # fn example() -> paperhooks::Result<()> {
//! let hook = PostConsume::from_env()?;
//! println!("document {} tagged {:?}", hook.document_id, hook.document_tags);
//! # Ok(())
//! # }
//! ```

mod postconsume;
mod preconsume;
mod vars;

pub use postconsume::PostConsume;
pub use preconsume::PreConsume;
pub use vars::parse_timestamp;
