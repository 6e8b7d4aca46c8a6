//! Pagination types
//!
//! Cursor codec, page envelope and the total-count hint.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Page size requested when a cursor doesn't carry one. Always sent so the
/// server default never applies.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "page_size";

// Continuation URLs may be relative; they are resolved against this
// placeholder since only the query string matters.
static PLACEHOLDER_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://paperless.invalid/").expect("placeholder base URL is valid"));

/// Position within a paginated collection.
///
/// A zero page means "unset" (first page), a zero size means "default size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Cursor {
    page: u64,
    size: u64,
}

impl Cursor {
    /// Create a cursor for a page number and page size
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Cursor for the first page with the given size
    pub fn with_size(size: u64) -> Self {
        Self { page: 0, size }
    }

    /// Page number, zero when unset
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Page size, zero when the default applies
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Page size that is sent to the server
    pub fn effective_size(&self) -> u64 {
        if self.size > 0 {
            self.size
        } else {
            DEFAULT_PAGE_SIZE
        }
    }

    /// Encode as query parameters.
    ///
    /// `page` is omitted for the first/unset page, `page_size` is always
    /// present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);

        if self.page > 0 {
            pairs.push((PAGE_PARAM, self.page.to_string()));
        }

        pairs.push((PAGE_SIZE_PARAM, self.effective_size().to_string()));
        pairs
    }

    /// Query pairs for an optional cursor; `None` encodes like the default
    /// cursor.
    pub fn query_pairs_for(cursor: Option<&Cursor>) -> Vec<(&'static str, String)> {
        cursor.copied().unwrap_or_default().query_pairs()
    }

    /// Decode a cursor from a continuation URL such as the `next` field of a
    /// list response.
    ///
    /// Returns `Ok(None)` for an empty URL. Absent parameters stay at zero;
    /// malformed numbers are an error.
    pub fn from_url(raw: &str) -> Result<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }

        let parsed = PLACEHOLDER_BASE.join(raw)?;

        let mut cursor = Cursor::default();

        for (name, dest) in [
            (PAGE_PARAM, &mut cursor.page),
            (PAGE_SIZE_PARAM, &mut cursor.size),
        ] {
            let Some(value) = parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
            else {
                continue;
            };

            if value.is_empty() {
                continue;
            }

            *dest = value.parse::<u64>().map_err(|e| Error::CursorParse {
                name: name.to_string(),
                value: value.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(Some(cursor))
    }
}

/// Total number of items across all pages, as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemCount {
    /// The server reported this many items
    Known(u64),
    /// Count absent or unparsable
    #[default]
    Unknown,
}

impl ItemCount {
    /// Interpret the raw `count` field of a list response
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_u64().map_or(Self::Unknown, Self::Known),
            Some(Value::String(s)) => s.trim().parse().map_or(Self::Unknown, Self::Known),
            _ => Self::Unknown,
        }
    }

    /// Count if known
    pub fn known(&self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unknown => None,
        }
    }
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Total item count hint
    pub count: ItemCount,
    /// Cursor for the following page, `None` on the last page
    pub next: Option<Cursor>,
    /// Cursor for the preceding page
    pub previous: Option<Cursor>,
    /// Items in server order
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// A terminal page without items
    pub fn empty() -> Self {
        Self {
            count: ItemCount::Unknown,
            next: None,
            previous: None,
            items: Vec::new(),
        }
    }

    /// Whether another page follows
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Raw JSON body of a collection GET
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub count: Option<Value>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> ListEnvelope<T> {
    /// Convert into a page, decoding the continuation URLs
    pub fn into_page(self) -> Result<Page<T>> {
        Ok(Page {
            count: ItemCount::from_json(self.count.as_ref()),
            next: Cursor::from_url(self.next.as_deref().unwrap_or_default())?,
            previous: Cursor::from_url(self.previous.as_deref().unwrap_or_default())?,
            items: self.results,
        })
    }
}
