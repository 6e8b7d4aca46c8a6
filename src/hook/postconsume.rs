//! Post-consumption script environment

use super::vars::HookVars;
use crate::error::Result;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;
use std::path::PathBuf;

pub const ENV_DOCUMENT_ID: &str = "DOCUMENT_ID";
pub const ENV_DOCUMENT_FILE_NAME: &str = "DOCUMENT_FILE_NAME";
pub const ENV_DOCUMENT_CREATED: &str = "DOCUMENT_CREATED";
pub const ENV_DOCUMENT_MODIFIED: &str = "DOCUMENT_MODIFIED";
pub const ENV_DOCUMENT_ADDED: &str = "DOCUMENT_ADDED";
pub const ENV_DOCUMENT_SOURCE_PATH: &str = "DOCUMENT_SOURCE_PATH";
pub const ENV_DOCUMENT_ARCHIVE_PATH: &str = "DOCUMENT_ARCHIVE_PATH";
pub const ENV_DOCUMENT_THUMBNAIL_PATH: &str = "DOCUMENT_THUMBNAIL_PATH";
pub const ENV_DOCUMENT_DOWNLOAD_URL: &str = "DOCUMENT_DOWNLOAD_URL";
pub const ENV_DOCUMENT_THUMBNAIL_URL: &str = "DOCUMENT_THUMBNAIL_URL";
pub const ENV_DOCUMENT_CORRESPONDENT: &str = "DOCUMENT_CORRESPONDENT";
pub const ENV_DOCUMENT_TAGS: &str = "DOCUMENT_TAGS";
pub const ENV_DOCUMENT_ORIGINAL_FILENAME: &str = "DOCUMENT_ORIGINAL_FILENAME";

/// Document details handed to a post-consumption script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostConsume {
    /// Primary key of the new document; zero when not given
    pub document_id: i64,
    /// Formatted filename, without directories
    pub document_file_name: String,
    pub document_created: Option<DateTime<FixedOffset>>,
    pub document_modified: Option<DateTime<FixedOffset>>,
    pub document_added: Option<DateTime<FixedOffset>>,
    /// Original document file
    pub document_source_path: Option<PathBuf>,
    /// Generated archive file, if any
    pub document_archive_path: Option<PathBuf>,
    pub document_thumbnail_path: Option<PathBuf>,
    /// Download URL, usually relative to the server
    pub document_download_url: Option<String>,
    pub document_thumbnail_url: Option<String>,
    /// Name of the assigned correspondent
    pub document_correspondent: String,
    /// Names of the applied tags
    pub document_tags: Vec<String>,
    pub document_original_filename: String,
}

impl PostConsume {
    /// Read the current process environment, placing offset-less timestamps
    /// in the local timezone
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), None)
    }

    /// Read from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, timezone: Option<Tz>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = HookVars::new(lookup, timezone);

        Ok(Self {
            document_id: vars.int(ENV_DOCUMENT_ID)?,
            document_file_name: vars.string(ENV_DOCUMENT_FILE_NAME),
            document_created: vars.timestamp(ENV_DOCUMENT_CREATED)?,
            document_modified: vars.timestamp(ENV_DOCUMENT_MODIFIED)?,
            document_added: vars.timestamp(ENV_DOCUMENT_ADDED)?,
            document_source_path: vars.path(ENV_DOCUMENT_SOURCE_PATH),
            document_archive_path: vars.path(ENV_DOCUMENT_ARCHIVE_PATH),
            document_thumbnail_path: vars.path(ENV_DOCUMENT_THUMBNAIL_PATH),
            document_download_url: vars.url(ENV_DOCUMENT_DOWNLOAD_URL)?,
            document_thumbnail_url: vars.url(ENV_DOCUMENT_THUMBNAIL_URL)?,
            document_correspondent: vars.string(ENV_DOCUMENT_CORRESPONDENT),
            document_tags: vars.list(ENV_DOCUMENT_TAGS),
            document_original_filename: vars.string(ENV_DOCUMENT_ORIGINAL_FILENAME),
        })
    }
}
