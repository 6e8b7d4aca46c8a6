//! Documents: model, upload and metadata

use super::models::CustomFieldInstance;
use super::{Client, Resource};
use crate::error::{Error, Result};
use crate::http::{error_from_response, RequestConfig};
use crate::pagination::Cursor;
use chrono::{DateTime, FixedOffset};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const UPLOAD_PATH: &str = "api/documents/post_document/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub id: i64,
    pub title: String,
    /// Plain-text content
    pub content: String,
    /// Assigned tag IDs
    pub tags: Vec<i64>,
    pub document_type: Option<i64>,
    pub correspondent: Option<i64>,
    pub storage_path: Option<i64>,
    pub created: Option<DateTime<FixedOffset>>,
    pub modified: Option<DateTime<FixedOffset>>,
    pub added: Option<DateTime<FixedOffset>>,
    /// Identifier in a physical document archive
    pub archive_serial_number: Option<i64>,
    pub original_file_name: String,
    /// `None` when no archived version exists
    pub archived_file_name: Option<String>,
    pub owner: Option<i64>,
    pub custom_fields: Vec<CustomFieldInstance>,
}

impl Document {
    pub fn resource() -> Resource<Self, DocumentListOptions> {
        Resource {
            base_path: "api/documents/",
            identity: |document| document.id,
            cursor: |options| options.page,
            set_cursor: |options, cursor| options.page = cursor,
        }
    }
}

/// Filters for listing documents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentListOptions {
    #[serde(skip)]
    pub page: Option<Cursor>,
    pub ordering: Option<String>,
    #[serde(rename = "title__icontains")]
    pub title_contains: Option<String>,
    #[serde(rename = "content__icontains")]
    pub content_contains: Option<String>,
    #[serde(rename = "correspondent__id")]
    pub correspondent: Option<i64>,
    #[serde(rename = "document_type__id")]
    pub document_type: Option<i64>,
    /// Documents carrying every one of these tags
    #[serde(rename = "tags__id__all")]
    pub tags_all: Vec<i64>,
    pub archive_serial_number: Option<i64>,
}

impl DocumentListOptions {
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
    pub fn title_contains(mut self, title: impl Into<String>) -> Self {
        self.title_contains = Some(title.into());
        self
    }

    #[must_use]
    pub fn content_contains(mut self, content: impl Into<String>) -> Self {
        self.content_contains = Some(content.into());
        self
    }

    #[must_use]
    pub fn correspondent(mut self, id: i64) -> Self {
        self.correspondent = Some(id);
        self
    }

    #[must_use]
    pub fn document_type(mut self, id: i64) -> Self {
        self.document_type = Some(id);
        self
    }

    #[must_use]
    pub fn tag(mut self, id: i64) -> Self {
        self.tags_all.push(id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentVersionMetadata {
    pub namespace: String,
    pub prefix: String,
    pub key: String,
    pub value: String,
}

/// File-level details of a document's original and archived versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub original_filename: String,
    #[serde(rename = "media_filename")]
    pub original_media_filename: String,
    pub original_checksum: String,
    pub original_size: i64,
    pub original_mime_type: String,
    pub original_metadata: Vec<DocumentVersionMetadata>,

    pub has_archive_version: bool,
    pub archive_media_filename: Option<String>,
    pub archive_checksum: Option<String>,
    pub archive_size: Option<i64>,
    pub archive_metadata: Option<Vec<DocumentVersionMetadata>>,

    #[serde(rename = "lang")]
    pub language: String,
}

/// Attributes sent along with an uploaded file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUploadOptions {
    /// File name reported to the server; directories are stripped
    pub filename: String,
    pub title: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
    pub correspondent: Option<i64>,
    pub document_type: Option<i64>,
    pub tags: Vec<i64>,
    pub archive_serial_number: Option<i64>,
}

impl DocumentUploadOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn created(mut self, created: DateTime<FixedOffset>) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub fn correspondent(mut self, id: i64) -> Self {
        self.correspondent = Some(id);
        self
    }

    #[must_use]
    pub fn document_type(mut self, id: i64) -> Self {
        self.document_type = Some(id);
        self
    }

    #[must_use]
    pub fn tag(mut self, id: i64) -> Self {
        self.tags.push(id);
        self
    }

    #[must_use]
    pub fn archive_serial_number(mut self, asn: i64) -> Self {
        self.archive_serial_number = Some(asn);
        self
    }

    /// Base name of `filename`, empty when it has none
    pub fn file_name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Form fields other than the file, in sending order. Tags repeat the
    /// field name.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        if let Some(title) = self.title.as_ref().filter(|title| !title.is_empty()) {
            fields.push(("title", title.clone()));
        }
        if let Some(created) = self.created {
            fields.push(("created", created.to_rfc3339()));
        }
        if let Some(id) = self.correspondent {
            fields.push(("correspondent", id.to_string()));
        }
        if let Some(id) = self.document_type {
            fields.push(("document_type", id.to_string()));
        }
        fields.extend(self.tags.iter().map(|id| ("tags", id.to_string())));
        if let Some(asn) = self.archive_serial_number {
            fields.push(("archive_serial_number", asn.to_string()));
        }

        fields
    }

    fn into_form(self, content: Vec<u8>) -> Form {
        let part = Part::bytes(content).file_name(self.file_name());

        self.form_fields()
            .into_iter()
            .fold(Form::new().part("document", part), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

/// Accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentUpload {
    /// Consumption task to poll with [`Client::wait_for_task`]
    pub task_id: String,
}

impl Client {
    /// Upload a file for consumption.
    ///
    /// Returns as soon as the server accepted the file. Consumption runs
    /// asynchronously; poll the returned task ID to learn the outcome.
    pub async fn upload_document(
        &self,
        content: impl Into<Vec<u8>>,
        options: DocumentUploadOptions,
        cancel: &CancellationToken,
    ) -> Result<DocumentUpload> {
        let form = options.into_form(content.into());

        let response = self
            .http
            .send_multipart(UPLOAD_PATH, RequestConfig::new(), form, cancel)
            .await?;

        if !matches!(response.status(), StatusCode::OK | StatusCode::NO_CONTENT) {
            return Err(error_from_response(response).await);
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            body = response.text() => body?,
        };

        let task_id = task_id_from_body(&body)?;
        debug!(task_id = %task_id, "Document accepted for consumption");

        Ok(DocumentUpload { task_id })
    }

    /// Upload a file from disk; without a file name in `options` the file's
    /// own name is used
    pub async fn upload_document_file(
        &self,
        path: impl AsRef<Path>,
        mut options: DocumentUploadOptions,
        cancel: &CancellationToken,
    ) -> Result<DocumentUpload> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;

        if options.filename.is_empty() {
            options.filename = path.to_string_lossy().into_owned();
        }

        self.upload_document(content, options, cancel).await
    }

    pub async fn get_document_metadata(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<DocumentMetadata> {
        self.http
            .get_json(
                &format!("api/documents/{id}/metadata/"),
                RequestConfig::new(),
                cancel,
            )
            .await
    }
}

/// The server answers with the task ID as a JSON string
fn task_id_from_body(body: &str) -> Result<String> {
    let task_id = serde_json::from_str::<String>(body)
        .unwrap_or_else(|_| body.trim().to_string());

    if task_id.is_empty() {
        return Err(Error::decode("upload response carries no task ID"));
    }

    Ok(task_id)
}
