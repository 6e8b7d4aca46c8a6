//! Pagination module
//!
//! Page-number pagination as spoken by the Paperless-ngx REST API.
//!
//! # Overview
//!
//! Collection endpoints answer with a list envelope carrying the items of one
//! page, a total count and `next`/`previous` continuation URLs. [`Cursor`]
//! encodes and decodes the page position found in those URLs, and
//! [`list_all`] walks a whole collection through any [`PageFetcher`] while
//! suppressing duplicates caused by concurrent server-side changes.

mod pipeline;
mod types;

pub use pipeline::{absorb_missing_page, list_all, PageFetcher, LOOKAHEAD_PAGES};
pub use types::{
    Cursor, ItemCount, ListEnvelope, Page, DEFAULT_PAGE_SIZE, PAGE_PARAM, PAGE_SIZE_PARAM,
};
