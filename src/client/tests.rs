//! Tests for the API client

use super::*;
use crate::error::Error;
use crate::http::HttpClientConfig;
use crate::pagination::{Cursor, ItemCount};
use crate::task::{TaskStatus, WaitPolicy};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Mutex;
use wiremock::matchers::{
    body_json, body_string_contains, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    Client::new(HttpClient::with_config(config).unwrap())
}

fn tag(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "slug": name.to_lowercase(),
        "name": name,
        "color": "#a6cee3",
        "text_color": "#000000",
        "match": "",
        "matching_algorithm": 1,
        "is_insensitive": true,
        "is_inbox_tag": false,
        "document_count": 3
    })
}

fn envelope(count: serde_json::Value, next: Option<String>, results: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results
    })
}

// ============================================================================
// Ping
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.ping(&CancellationToken::new()).await.unwrap();
}

#[tokio::test]
async fn test_ping_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.ping(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("Invalid token."));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/"))
        .and(query_param_is_missing("page"))
        .and(query_param("page_size", "25"))
        .and(query_param("ordering", "-name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!("2"),
            Some(format!("{}/api/tags/?page=2&page_size=25", mock_server.uri())),
            vec![tag(1, "Inbox")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let page = client
        .list(
            &Tag::resource(),
            &ListOptions::new().ordering("-name"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(page.count, ItemCount::Known(2));
    assert_eq!(page.next, Some(Cursor::new(2, 25)));
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Inbox");
    assert_eq!(page.items[0].matching_algorithm, MatchingAlgorithm::Any);
}

#[tokio::test]
async fn test_list_missing_later_page_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/correspondents/"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Invalid page."})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let page = client
        .list(
            &Correspondent::resource(),
            &ListOptions::new().page(Cursor::new(3, 25)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_list_missing_first_page_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/document_types/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .list(
            &DocumentType::resource(),
            &ListOptions::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_bad_next_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/storage_paths/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(1),
            Some("/api/storage_paths/?page=two".into()),
            vec![],
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .list(
            &StoragePath::resource(),
            &ListOptions::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CursorParse { .. }));
}

#[tokio::test]
async fn test_list_all_pages_with_duplicates() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/api/tags/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(4),
            None,
            vec![tag(3, "Gamma"), tag(4, "Delta")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tags/"))
        .and(query_param_is_missing("page"))
        .and(query_param("page_size", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(4),
            Some(format!("{uri}/api/tags/?page=2&page_size=3")),
            vec![tag(1, "Alpha"), tag(2, "Beta"), tag(3, "Gamma")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let seen = Mutex::new(Vec::new());

    client
        .list_all(
            &Tag::resource(),
            &ListOptions::new().page(Cursor::with_size(3)),
            &CancellationToken::new(),
            |tag: Tag| {
                seen.lock().unwrap().push(tag.id);
                async { Ok(()) }
            },
        )
        .await
        .unwrap();

    assert_eq!(seen.into_inner().unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_list_all_handler_error_stops() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(2),
            None,
            vec![tag(1, "Alpha"), tag(2, "Beta")],
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut calls = 0;

    let err = client
        .list_all(
            &Tag::resource(),
            &ListOptions::new(),
            &CancellationToken::new(),
            |_tag: Tag| {
                calls += 1;
                async { Err(Error::Other("stop".into())) }
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "stop");
    assert_eq!(calls, 1);
}

// ============================================================================
// Single items
// ============================================================================

#[tokio::test]
async fn test_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tag(7, "Bills")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let got = client
        .get(&Tag::resource(), 7, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(got.id, 7);
    assert_eq!(got.slug, "bills");
    assert_eq!(got.document_count, 3);
}

#[tokio::test]
async fn test_create() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/"))
        .and(body_json(json!({"name": "New"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(tag(12, "New")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = client
        .create(
            &Tag::resource(),
            &json!({"name": "New"}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(created.id, 12);
}

#[tokio::test]
async fn test_create_requires_created_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tag(12, "New")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create(
            &Tag::resource(),
            &json!({"name": "New"}),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Request { status: 200, ref message } if message == "unexpected status 200 OK"
    ));
}

#[tokio::test]
async fn test_create_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": ["This field is required."]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create(&Tag::resource(), &json!({}), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Request { status: 400, ref message } if message == r#"{"name":["This field is required."]}"#
    ));
}

#[tokio::test]
async fn test_update_and_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/storage_paths/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Archive", "path": "{created_year}/{title}"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/storage_paths/5/"))
        .and(body_json(json!({"name": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Renamed", "path": "{created_year}/{title}"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let cancel = CancellationToken::new();
    let resource = StoragePath::resource();

    let data = StoragePath {
        id: 5,
        name: "Archive".into(),
        path: "{created_year}/{title}".into(),
        ..StoragePath::default()
    };
    let updated = client.update(&resource, 5, &data, &cancel).await.unwrap();
    assert_eq!(updated.name, "Archive");

    let patched = client
        .patch(&resource, 5, &json!({"name": "Renamed"}), &cancel)
        .await
        .unwrap();
    assert_eq!(patched.name, "Renamed");
    assert_eq!(patched.path, "{created_year}/{title}");
}

#[tokio::test]
async fn test_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/correspondents/9/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .delete(&Correspondent::resource(), 9, &CancellationToken::new())
        .await
        .unwrap();
}

#[test]
fn test_matching_algorithm_json() {
    let algorithm: MatchingAlgorithm = serde_json::from_value(json!(6)).unwrap();
    assert_eq!(algorithm, MatchingAlgorithm::Auto);
    assert_eq!(serde_json::to_value(MatchingAlgorithm::Regex).unwrap(), json!(4));
    assert!(serde_json::from_value::<MatchingAlgorithm>(json!(42)).is_err());
}

// ============================================================================
// Tasks
// ============================================================================

fn task_json(task_id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": 27502,
        "task_id": task_id,
        "task_file_name": "scan.pdf",
        "type": "file",
        "status": status,
        "result": "Success. New document id 26150 created",
        "acknowledged": false
    })
}

#[tokio::test]
async fn test_list_tasks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("a", "PENDING"),
            task_json("b", "SUCCESS"),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let tasks = client.list_tasks(&CancellationToken::new()).await.unwrap();

    let statuses: Vec<TaskStatus> = tasks.iter().map(|t| t.status).collect();
    assert_eq!(statuses, vec![TaskStatus::Pending, TaskStatus::Success]);
}

#[tokio::test]
async fn test_get_task() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("task_id", "one"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json("one", "STARTED")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("task_id", "none"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("task_id", "many"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("many", "STARTED"),
            task_json("many", "PENDING"),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let cancel = CancellationToken::new();

    let task = client.get_task("one", &cancel).await.unwrap();
    assert_eq!(task.task_id, "one");
    assert_eq!(task.status, TaskStatus::Started);

    let err = client.get_task("none", &cancel).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Request { status: 404, ref message } if message == "task \"none\" not found"
    ));

    let err = client.get_task("many", &cancel).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Request { status: 300, ref message } if message == "received 2 tasks for ID \"many\""
    ));
}

#[tokio::test]
async fn test_wait_for_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("task_id", "successtask"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([task_json("successtask", "SUCCESS")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let task = client
        .wait_for_task("successtask", WaitPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(task.id, 27502);
    assert_eq!(task.task_file_name.as_deref(), Some("scan.pdf"));
}

#[tokio::test]
async fn test_wait_for_task_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 281,
            "task_id": "failtask",
            "status": "FAILURE",
            "result": "not a PDF"
        }])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .wait_for_task("failtask", WaitPolicy::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "task \"failtask\" status is FAILURE: not a PDF");
    assert_eq!(err.failed_task().map(|t| t.id), Some(281));
}

#[tokio::test]
async fn test_wait_for_task_not_found_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .wait_for_task("xyz404", WaitPolicy::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_wait_for_task_bad_json_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .wait_for_task("badjson", WaitPolicy::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
}

// ============================================================================
// Logs
// ============================================================================

#[tokio::test]
async fn test_list_logs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["paperless", "mail"])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let names = client.list_logs(&CancellationToken::new()).await.unwrap();

    assert_eq!(names, vec!["paperless".to_string(), "mail".to_string()]);
}

#[tokio::test]
async fn test_get_log() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/paperless/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "[2023-02-28 00:28:37,604] [INFO] [paperless.consumer] Consuming xyz.pdf",
            "[2023-02-28 00:28:38,001] [ERROR] [paperless.consumer] Failed:",
            "  Traceback"
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_timezone(Some(chrono_tz::UTC));
    let entries = client
        .get_log("paperless", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].module, "paperless.consumer");
    assert_eq!(entries[1].level, "ERROR");
    assert_eq!(entries[1].message, "Failed:\n  Traceback");
    assert_eq!(
        entries[0].time.map(|t| t.timestamp_subsec_millis()),
        Some(604)
    );
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_upload_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/documents/post_document/"))
        .and(body_string_contains("test content"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#""e068eb08-cf70-4755-8087-3cf0644f3c7b""#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let upload = client
        .upload_document(
            b"test content".to_vec(),
            DocumentUploadOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(upload.task_id, "e068eb08-cf70-4755-8087-3cf0644f3c7b");
}

#[tokio::test]
async fn test_upload_document_sends_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/documents/post_document/"))
        .and(body_string_contains("filename=\"myfile.txt\""))
        .and(body_string_contains("\r\n\r\ndoctitle\r\n"))
        .and(body_string_contains("name=\"tags\"\r\n\r\n301\r\n"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#""0dbf0a2b-3a09-4d7b-96bf-51544dda8427""#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = DocumentUploadOptions::new("/home/user/scans/myfile.txt")
        .title("doctitle")
        .correspondent(100)
        .tag(300)
        .tag(301);

    let client = client_for(&mock_server);
    let upload = client
        .upload_document("more content", options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(upload.task_id, "0dbf0a2b-3a09-4d7b-96bf-51544dda8427");
}

#[tokio::test]
async fn test_upload_document_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/documents/post_document/"))
        .respond_with(ResponseTemplate::new(418).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .upload_document(Vec::new(), DocumentUploadOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { status: 418, ref message } if message == "{}"));
}

#[tokio::test]
async fn test_upload_document_file_then_wait() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/documents/post_document/"))
        .and(body_string_contains("filename=\"scan.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#""t-upload""#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("task_id", "t-upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "task_id": "t-upload",
            "status": "SUCCESS",
            "result": "Success. New document id 42 created"
        }])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("scan.pdf");
    std::fs::write(&file, b"%PDF-1.7").unwrap();

    let client = client_for(&mock_server);
    let cancel = CancellationToken::new();
    let upload = client
        .upload_document_file(&file, DocumentUploadOptions::default(), &cancel)
        .await
        .unwrap();
    let task = client
        .wait_for_task(&upload.task_id, WaitPolicy::default(), &cancel)
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Success);
}

#[tokio::test]
async fn test_list_all_documents_with_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/"))
        .and(query_param("tags__id__all", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(2),
            None,
            vec![
                json!({"id": 10, "title": "Invoice", "tags": [1, 2], "archived_file_name": null}),
                json!({"id": 11, "title": "Receipt", "tags": [1, 2, 5], "created": "2023-01-02T00:00:00+01:00"}),
            ],
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let seen = Mutex::new(Vec::new());
    client
        .list_all(
            &Document::resource(),
            &DocumentListOptions::new().tag(1).tag(2),
            &CancellationToken::new(),
            |document: Document| {
                seen.lock().unwrap().push(document);
                async { Ok(()) }
            },
        )
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].title, "Invoice");
    assert_eq!(seen[0].archived_file_name, None);
    assert_eq!(seen[1].created.map(|t| t.timestamp()), Some(1_672_614_000));
}

#[tokio::test]
async fn test_get_document_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/42/metadata/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "original_checksum": "abc",
            "original_size": 1234,
            "original_mime_type": "application/pdf",
            "media_filename": "0000042.pdf",
            "has_archive_version": false,
            "original_metadata": [],
            "archive_checksum": null,
            "archive_media_filename": null,
            "original_filename": "scan.pdf",
            "lang": "de",
            "archive_size": null,
            "archive_metadata": null
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let metadata = client
        .get_document_metadata(42, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(metadata.original_size, 1234);
    assert_eq!(metadata.original_media_filename, "0000042.pdf");
    assert_eq!(metadata.language, "de");
    assert_eq!(metadata.archive_size, None);
    assert!(!metadata.has_archive_version);
}

// ============================================================================
// Downloads
// ============================================================================

#[tokio::test]
async fn test_download_original() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/7/download/"))
        .and(query_param("original", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"content".to_vec(), "foo/bar; charset=utf-8")
                .insert_header("Content-Disposition", r#"inline; filename="../test.txt""#),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut out = Vec::new();
    let result = client
        .download_original(7, &mut out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out, b"content");
    assert_eq!(
        result,
        DownloadResult {
            content_type: "foo/bar".into(),
            content_type_params: [("charset".to_string(), "utf-8".to_string())].into(),
            filename: Some("test.txt".into()),
            length: 7,
        }
    );
}

#[tokio::test]
async fn test_download_thumbnail_without_disposition() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/7/thumb/"))
        .and(query_param_is_missing("original"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/webp"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut out = Vec::new();
    let result = client
        .download_thumbnail(7, &mut out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.content_type, "image/webp");
    assert_eq!(result.filename, None);
    assert_eq!(result.length, 16);
}

#[tokio::test]
async fn test_download_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/7/download/"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut out = Vec::new();
    let err = client
        .download_archived(7, &mut out, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Request { status: 418, ref message } if message == "418 I'm a teapot"
    ));
    assert!(out.is_empty());
}

// ============================================================================
// Server information
// ============================================================================

#[tokio::test]
async fn test_get_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pngx_version": "2.7.2",
            "server_os": "Linux",
            "install_type": "docker",
            "storage": {"total": 1000, "available": 400},
            "database": {
                "type": "postgresql",
                "url": "paperless",
                "status": "OK",
                "error": null,
                "migration_status": {
                    "latest_migration": "documents.1046",
                    "unapplied_migrations": []
                }
            },
            "tasks": {
                "redis_url": "redis://broker:6379",
                "redis_status": "OK",
                "redis_error": null,
                "celery_status": "OK",
                "index_status": "OK",
                "index_last_modified": "2024-03-03T00:00:00+01:00",
                "classifier_status": "WARNING",
                "classifier_last_trained": null,
                "classifier_error": "No classifier"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let status = client.get_status(&CancellationToken::new()).await.unwrap();

    assert_eq!(status.pngx_version, "2.7.2");
    assert_eq!(status.storage.available, 400);
    assert_eq!(status.database.kind, "postgresql");
    assert_eq!(status.database.migration_status.latest_migration, "documents.1046");
    assert!(status.tasks.index_last_modified.is_some());
    assert_eq!(status.tasks.classifier_error.as_deref(), Some("No classifier"));
}

#[tokio::test]
async fn test_get_statistics() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents_total": 120,
            "documents_inbox": 4,
            "inbox_tags": [1],
            "document_file_type_counts": [
                {"mime_type": "application/pdf", "mime_type_count": 118}
            ],
            "character_count": 99999,
            "tag_count": 12
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let stats = client.get_statistics(&CancellationToken::new()).await.unwrap();

    assert_eq!(stats.documents_total, 120);
    assert_eq!(stats.documents_inbox, Some(4));
    assert_eq!(stats.inbox_tag, None);
    assert_eq!(stats.document_file_type_counts[0].mime_type_count, 118);
}

#[tokio::test]
async fn test_get_remote_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/remote_version/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "v2.14.7",
            "update_available": false
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let version = client
        .get_remote_version(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        version,
        RemoteVersion {
            version: "v2.14.7".into(),
            update_available: false,
        }
    );
}

#[tokio::test]
async fn test_get_remote_version_bad_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/remote_version/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_remote_version(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
}

// ============================================================================
// Users, groups and custom fields
// ============================================================================

#[tokio::test]
async fn test_get_current_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ui_settings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 3, "username": "admin"},
            "settings": {}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "username": "admin",
            "is_superuser": true
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let user = client.get_current_user(&CancellationToken::new()).await.unwrap();

    assert_eq!(user.username, "admin");
    assert!(user.is_superuser);
}

#[tokio::test]
async fn test_get_current_user_missing_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ui_settings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_current_user(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_list_users_groups_and_custom_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .and(query_param("username__icontains", "adm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(1),
            None,
            vec![json!({"id": 3, "username": "admin"})],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/groups/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(2),
            None,
            vec![json!({"id": 1, "name": "staff"}), json!({"id": 2, "name": "family"})],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/custom_fields/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!(1),
            None,
            vec![json!({"id": 5, "name": "Amount", "data_type": "monetary"})],
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let cancel = CancellationToken::new();

    let users = client
        .list(&User::resource(), &UserListOptions::new().username_contains("adm"), &cancel)
        .await
        .unwrap();
    assert_eq!(users.items.len(), 1);
    assert_eq!(users.items[0].username, "admin");

    let groups = client
        .list(&Group::resource(), &ListOptions::new(), &cancel)
        .await
        .unwrap();
    assert_eq!(
        groups.items.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
        vec!["staff", "family"]
    );

    let fields = client
        .list(&CustomField::resource(), &ListOptions::new(), &cancel)
        .await
        .unwrap();
    assert_eq!(fields.items[0].data_type, "monetary");
}
