//! Entity models and their collection descriptors

use super::crud::Resource;
use crate::error::Error;
use crate::pagination::Cursor;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Algorithm used to automatically assign an object to documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchingAlgorithm {
    #[default]
    None,
    /// Any word
    Any,
    /// All words
    All,
    /// Exact match
    Literal,
    /// Regular expression
    Regex,
    /// Fuzzy word
    Fuzzy,
    /// Document classification model
    Auto,
}

impl TryFrom<u8> for MatchingAlgorithm {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::None,
            1 => Self::Any,
            2 => Self::All,
            3 => Self::Literal,
            4 => Self::Regex,
            5 => Self::Fuzzy,
            6 => Self::Auto,
            other => return Err(Error::decode(format!("unknown matching algorithm {other}"))),
        })
    }
}

impl From<MatchingAlgorithm> for u8 {
    fn from(value: MatchingAlgorithm) -> Self {
        value as u8
    }
}

/// Filters shared by the simple collections.
///
/// `page` is not sent as a field; the list routines turn it into the
/// pagination query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListOptions {
    #[serde(skip)]
    pub page: Option<Cursor>,
    /// Field to order by; prefix with `-` for descending order
    pub ordering: Option<String>,
    pub owner: Option<i64>,
    #[serde(rename = "name__icontains")]
    pub name_contains: Option<String>,
    #[serde(rename = "name__iexact")]
    pub name_exact: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, cursor: Cursor) -> Self {
        self.page = Some(cursor);
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: i64) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Case-insensitive substring match on the name
    #[must_use]
    pub fn name_contains(mut self, name: impl Into<String>) -> Self {
        self.name_contains = Some(name.into());
        self
    }

    /// Case-insensitive exact match on the name
    #[must_use]
    pub fn name_exact(mut self, name: impl Into<String>) -> Self {
        self.name_exact = Some(name.into());
        self
    }
}

fn page_of(options: &ListOptions) -> Option<Cursor> {
    options.page
}

fn set_page_of(options: &mut ListOptions, cursor: Option<Cursor>) {
    options.page = cursor;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Background colour as `#rrggbb`
    pub color: String,
    pub text_color: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub matching_algorithm: MatchingAlgorithm,
    pub is_insensitive: bool,
    pub is_inbox_tag: bool,
    pub document_count: i64,
}

impl Tag {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/tags/",
            identity: |tag| tag.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correspondent {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub matching_algorithm: MatchingAlgorithm,
    pub is_insensitive: bool,
    pub document_count: i64,
    pub last_correspondence: Option<DateTime<FixedOffset>>,
}

impl Correspondent {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/correspondents/",
            identity: |correspondent| correspondent.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentType {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub matching_algorithm: MatchingAlgorithm,
    pub is_insensitive: bool,
    pub document_count: i64,
}

impl DocumentType {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/document_types/",
            identity: |document_type| document_type.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoragePath {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Path template for stored documents
    pub path: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    pub matching_algorithm: MatchingAlgorithm,
    pub is_insensitive: bool,
    pub document_count: i64,
}

impl StoragePath {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/storage_paths/",
            identity: |path| path.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    /// Value type such as `string`, `date` or `monetary`
    pub data_type: String,
    pub owner: Option<i64>,
}

impl CustomField {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/custom_fields/",
            identity: |field| field.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}

/// Value of a custom field on a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldInstance {
    pub field: i64,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl User {
    pub fn resource() -> Resource<Self, UserListOptions> {
        Resource {
            base_path: "api/users/",
            identity: |user| user.id,
            cursor: |options| options.page,
            set_cursor: |options, cursor| options.page = cursor,
        }
    }
}

/// Filters for listing users
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserListOptions {
    #[serde(skip)]
    pub page: Option<Cursor>,
    pub ordering: Option<String>,
    #[serde(rename = "username__icontains")]
    pub username_contains: Option<String>,
    #[serde(rename = "username__iexact")]
    pub username_exact: Option<String>,
}

impl UserListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn username_contains(mut self, username: impl Into<String>) -> Self {
        self.username_contains = Some(username.into());
        self
    }

    #[must_use]
    pub fn username_exact(mut self, username: impl Into<String>) -> Self {
        self.username_exact = Some(username.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

impl Group {
    pub fn resource() -> Resource<Self, ListOptions> {
        Resource {
            base_path: "api/groups/",
            identity: |group| group.id,
            cursor: page_of,
            set_cursor: set_page_of,
        }
    }
}
