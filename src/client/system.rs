//! Server-wide read endpoints

use super::models::User;
use super::Client;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Health of the installation and its services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub pngx_version: String,
    pub server_os: String,
    pub install_type: String,
    pub storage: SystemStatusStorage,
    pub database: SystemStatusDatabase,
    pub tasks: SystemStatusTasks,
}

/// Storage space in bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatusStorage {
    pub total: i64,
    pub available: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatusDatabase {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub status: String,
    pub error: Option<String>,
    pub migration_status: SystemStatusDatabaseMigration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatusDatabaseMigration {
    pub latest_migration: String,
    pub unapplied_migrations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatusTasks {
    pub redis_url: String,
    pub redis_status: String,
    pub redis_error: Option<String>,
    pub celery_status: String,
    pub celery_url: Option<String>,
    pub celery_error: Option<String>,
    pub index_status: String,
    pub index_last_modified: Option<DateTime<FixedOffset>>,
    pub index_error: Option<String>,
    pub classifier_status: String,
    pub classifier_last_trained: Option<DateTime<FixedOffset>>,
    pub classifier_error: Option<String>,
    pub sanity_check_status: String,
    pub sanity_check_last_run: Option<DateTime<FixedOffset>>,
    pub sanity_check_error: Option<String>,
}

/// Document counts and collection sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub documents_total: i64,
    pub documents_inbox: Option<i64>,
    pub inbox_tag: Option<i64>,
    pub inbox_tags: Vec<i64>,
    pub document_file_type_counts: Vec<DocumentFileType>,
    pub character_count: i64,
    pub tag_count: i64,
    pub correspondent_count: i64,
    pub document_type_count: i64,
    pub storage_path_count: i64,
    pub current_asn: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFileType {
    pub mime_type: String,
    pub mime_type_count: i64,
}

/// Newest release known to the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteVersion {
    pub version: String,
    pub update_available: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiSettings {
    user: UiSettingsUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiSettingsUser {
    id: Option<i64>,
}

impl Client {
    pub async fn get_status(&self, cancel: &CancellationToken) -> Result<SystemStatus> {
        self.http
            .get_json("api/status/", RequestConfig::new(), cancel)
            .await
    }

    pub async fn get_statistics(&self, cancel: &CancellationToken) -> Result<Statistics> {
        self.http
            .get_json("api/statistics/", RequestConfig::new(), cancel)
            .await
    }

    pub async fn get_remote_version(&self, cancel: &CancellationToken) -> Result<RemoteVersion> {
        self.http
            .get_json("api/remote_version/", RequestConfig::new(), cancel)
            .await
    }

    /// The user the client authenticates as
    pub async fn get_current_user(&self, cancel: &CancellationToken) -> Result<User> {
        let settings: UiSettings = self
            .http
            .get_json("api/ui_settings/", RequestConfig::new(), cancel)
            .await?;

        let id = settings
            .user
            .id
            .ok_or_else(|| Error::decode("missing user ID in UI settings"))?;

        self.get(&User::resource(), id, cancel).await
    }
}
