//! Shared CRUD routines
//!
//! Every collection endpoint behaves the same way; a [`Resource`] describes
//! where it lives and how to read identities and page cursors so the routines
//! below can serve all of them.

use crate::error::{Error, Result};
use crate::http::{error_from_response, read_json, HttpClient, RequestConfig};
use crate::pagination::{self, absorb_missing_page, Cursor, ListEnvelope, Page, PageFetcher};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Describes a collection endpoint holding items of type `T` filtered by
/// list options of type `O`
pub struct Resource<T, O> {
    /// Collection path relative to the base URL, with trailing slash
    pub base_path: &'static str,
    /// Unique item identity used for duplicate suppression
    pub identity: fn(&T) -> i64,
    /// Page position stored in the list options
    pub cursor: fn(&O) -> Option<Cursor>,
    pub set_cursor: fn(&mut O, Option<Cursor>),
}

impl<T, O> Resource<T, O> {
    fn item_path(&self, id: i64) -> String {
        format!("{}{id}/", self.base_path)
    }
}

impl<T, O> Clone for Resource<T, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, O> Copy for Resource<T, O> {}

impl<T, O> fmt::Debug for Resource<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

/// Fetch one page of a collection.
///
/// A missing page past the first is reported as an empty, terminal page.
pub async fn list<T, O>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    options: &O,
    cancel: &CancellationToken,
) -> Result<Page<T>>
where
    T: DeserializeOwned,
    O: Serialize,
{
    let cursor = (resource.cursor)(options);

    let result: Result<Page<T>> = async {
        let config = RequestConfig::new()
            .query_pairs(Cursor::query_pairs_for(cursor.as_ref()))
            .query_from(options)?;

        let response = http
            .request(Method::GET, resource.base_path, config, cancel)
            .await?;
        let envelope: ListEnvelope<T> = read_json(response, cancel).await?;
        envelope.into_page()
    }
    .await;

    absorb_missing_page(cursor.as_ref(), result)
}

/// Invoke `handler` once for every distinct item of the collection matching
/// `options`, starting at the cursor stored in `options`.
pub async fn list_all<T, O, H, Fut>(
    http: &HttpClient,
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
    let fetcher = ResourceFetcher {
        http,
        resource,
        options: options.clone(),
    };

    pagination::list_all(
        &fetcher,
        resource.identity,
        (resource.cursor)(options),
        cancel,
        handler,
    )
    .await
}

/// Page source backed by a collection endpoint
struct ResourceFetcher<'a, T, O> {
    http: &'a HttpClient,
    resource: &'a Resource<T, O>,
    options: O,
}

#[async_trait]
impl<T, O> PageFetcher<T> for ResourceFetcher<'_, T, O>
where
    T: DeserializeOwned + Send,
    O: Serialize + Clone + Send + Sync,
{
    async fn fetch_page(&self, cursor: Option<Cursor>, cancel: &CancellationToken) -> Result<Page<T>> {
        let mut options = self.options.clone();
        (self.resource.set_cursor)(&mut options, cursor);
        list(self.http, self.resource, &options, cancel).await
    }
}

/// Fetch a single item
pub async fn get<T, O>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    id: i64,
    cancel: &CancellationToken,
) -> Result<T>
where
    T: DeserializeOwned,
{
    http.get_json(&resource.item_path(id), RequestConfig::new(), cancel)
        .await
}

/// Create an item; the server must answer 201
pub async fn create<T, O, B>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    data: &B,
    cancel: &CancellationToken,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let config = RequestConfig::new().json(serde_json::to_value(data)?);
    let response = http
        .send(Method::POST, resource.base_path, config, cancel)
        .await?;

    let status = response.status();
    if status == StatusCode::CREATED {
        return read_json(response, cancel).await;
    }

    if status.is_success() {
        return Err(Error::request(
            status.as_u16(),
            format!("unexpected status {status}"),
        ));
    }

    Err(error_from_response(response).await)
}

/// Replace an item
pub async fn update<T, O>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    id: i64,
    data: &T,
    cancel: &CancellationToken,
) -> Result<T>
where
    T: DeserializeOwned + Serialize,
{
    let config = RequestConfig::new().json(serde_json::to_value(data)?);
    http.request_json(Method::PUT, &resource.item_path(id), config, cancel)
        .await
}

/// Modify some fields of an item
pub async fn patch<T, O, B>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    id: i64,
    fields: &B,
    cancel: &CancellationToken,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let config = RequestConfig::new().json(serde_json::to_value(fields)?);
    http.request_json(Method::PATCH, &resource.item_path(id), config, cancel)
        .await
}

/// Delete an item
pub async fn delete<T, O>(
    http: &HttpClient,
    resource: &Resource<T, O>,
    id: i64,
    cancel: &CancellationToken,
) -> Result<()> {
    http.request(
        Method::DELETE,
        &resource.item_path(id),
        RequestConfig::new(),
        cancel,
    )
    .await?;

    Ok(())
}
