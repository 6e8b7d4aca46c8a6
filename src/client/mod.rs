//! Paperless-ngx API client
//!
//! [`Client`] ties the HTTP transport to the API surface: collection CRUD
//! through [`Resource`] descriptors, document upload and download, task
//! lookup and waiting, server status and log access.
//!
//! # Example
//!
//! ```no_run
//! use paperhooks::client::{Client, ListOptions, Tag};
//! use paperhooks::http::{HttpClient, HttpClientConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> paperhooks::Result<()> {
//! let http = HttpClient::with_config(
//!     HttpClientConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .max_concurrent_requests(4)
//!         .build(),
//! )?;
//! let client = Client::new(http);
//! let cancel = CancellationToken::new();
//!
//! client
//!     .list_all(&Tag::resource(), &ListOptions::new(), &cancel, |tag: Tag| async move {
//!         println!("{}", tag.name);
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod crud;
mod documents;
mod download;
mod logs;
mod models;
mod system;
mod tasks;

pub use crud::Resource;
pub use documents::{
    Document, DocumentListOptions, DocumentMetadata, DocumentUpload, DocumentUploadOptions,
    DocumentVersionMetadata,
};
pub use download::{parse_media_type, DownloadResult};
pub use models::{
    Correspondent, CustomField, CustomFieldInstance, DocumentType, Group, ListOptions,
    MatchingAlgorithm, StoragePath, Tag, User, UserListOptions,
};
pub use system::{
    DocumentFileType, RemoteVersion, Statistics, SystemStatus, SystemStatusDatabase,
    SystemStatusDatabaseMigration, SystemStatusStorage, SystemStatusTasks,
};

use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::Page;
use chrono_tz::Tz;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// API client; cheap to clone
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    timezone: Option<Tz>,
}

impl Client {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            timezone: None,
        }
    }

    /// Timezone the server writes log timestamps in; `None` means local time
    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    /// Check whether the API is reachable
    pub async fn ping(&self, cancel: &CancellationToken) -> Result<()> {
        self.http
            .request(Method::GET, "api/", RequestConfig::new(), cancel)
            .await?;
        Ok(())
    }

    /// Fetch the page of `resource` selected by `options`
    pub async fn list<T, O>(
        &self,
        resource: &Resource<T, O>,
        options: &O,
        cancel: &CancellationToken,
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        O: Serialize,
    {
        crud::list(&self.http, resource, options, cancel).await
    }

    /// Invoke `handler` for every distinct item of `resource` matching
    /// `options`
    pub async fn list_all<T, O, H, Fut>(
        &self,
        resource: &Resource<T, O>,
        options: &O,
        cancel: &CancellationToken,
        handler: H,
    ) -> Result<()>
    where
        T: DeserializeOwned + Send,
        O: Serialize + Clone + Send + Sync,
        H: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        crud::list_all(&self.http, resource, options, cancel, handler).await
    }

    pub async fn get<T, O>(
        &self,
        resource: &Resource<T, O>,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        crud::get(&self.http, resource, id, cancel).await
    }

    pub async fn create<T, O, B>(
        &self,
        resource: &Resource<T, O>,
        data: &B,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        crud::create(&self.http, resource, data, cancel).await
    }

    pub async fn update<T, O>(
        &self,
        resource: &Resource<T, O>,
        id: i64,
        data: &T,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned + Serialize,
    {
        crud::update(&self.http, resource, id, data, cancel).await
    }

    pub async fn patch<T, O, B>(
        &self,
        resource: &Resource<T, O>,
        id: i64,
        fields: &B,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        crud::patch(&self.http, resource, id, fields, cancel).await
    }

    pub async fn delete<T, O>(
        &self,
        resource: &Resource<T, O>,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        crud::delete(&self.http, resource, id, cancel).await
    }
}

#[cfg(test)]
mod tests;
