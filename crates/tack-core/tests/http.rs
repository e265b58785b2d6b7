mod common;

use std::rc::Rc;

use common::{local_spawner, settle};
use serde_json::json;
use tack_core::memory::{MemoryFile, MemoryPage};
use tack_core::{
    Config, ErrorKind, FileHandle, HttpTransfer, TextareaSurface, Transfer, TransferError,
    Uploader,
};
use tokio::task::LocalSet;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> Config {
    Config::from_json(
        &json!({
            "endpoint": format!("{}/upload", server.uri()),
            "assets_prefix": "https://cdn.x/",
            "upload_channel": "telegram",
            "server_compress": true,
            "auth_code": "",
            "api_token": "tok",
        })
        .to_string(),
    )
    .unwrap()
}

fn png() -> Rc<dyn FileHandle> {
    MemoryFile::new("a.png", "image/png", vec![7u8; 10]).shared()
}

#[tokio::test]
async fn test_upload_resolves_to_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(query_param("uploadChannel", "telegram"))
        .and(query_param("serverCompress", "true"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"src": "/u/a.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server);
    LocalSet::new()
        .run_until(async {
            let page = MemoryPage::new();
            let textarea = page.open_plain("");
            let uploader = Uploader::new(Rc::new(page.clone()), config, local_spawner());
            uploader.start();

            page.paste(vec![png()]);
            let placeholder = textarea.value();
            assert!(placeholder.contains("![uploading..."));

            settle(uploader.engine()).await;
            assert_eq!(textarea.value(), "\n![a.png](https://cdn.x/u/a.png)\n\n");
        })
        .await;
}

#[tokio::test]
async fn test_server_error_resolves_to_failure_marker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config(&server);
    LocalSet::new()
        .run_until(async {
            let page = MemoryPage::new();
            let textarea = page.open_plain("");
            let uploader = Uploader::new(Rc::new(page.clone()), config, local_spawner());
            uploader.start();

            page.paste(vec![png()]);
            settle(uploader.engine()).await;

            let value = textarea.value();
            assert!(value.starts_with("\n[upload-failed(server error)-"));
            assert!(!value.contains("uploading..."));
        })
        .await;
}

#[tokio::test]
async fn test_multipart_carries_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"a.png\""))
        .and(body_string_contains("image/png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"src": "https://img.x/a.png"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transfer = HttpTransfer::new(Rc::new(config(&server)));
    let result = transfer.upload(png()).await.unwrap();
    assert_eq!(result.url, "https://img.x/a.png");
    assert_eq!(result.filename, "a.png");
}

#[tokio::test]
async fn test_unnamed_file_gets_generated_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("filename=\"file_"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"src": "/u/x.png"})))
        .mount(&server)
        .await;

    let transfer = HttpTransfer::new(Rc::new(config(&server)));
    let file = MemoryFile::new("", "image/png", vec![1u8; 4]).shared();
    let result = transfer.upload(file).await.unwrap();
    assert!(result.filename.starts_with("file_"));
    assert_eq!(result.url, "https://cdn.x/u/x.png");
}

#[tokio::test]
async fn test_bad_bodies_are_format_errors() {
    let server = MockServer::start().await;
    Mock::given(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transfer = HttpTransfer::new(Rc::new(config(&server)));
    let error = transfer.upload(png()).await.unwrap_err();
    assert!(matches!(error, TransferError::InvalidJson(_)));
    assert_eq!(error.kind(), ErrorKind::Format);

    server.reset().await;
    Mock::given(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    let error = transfer.upload(png()).await.unwrap_err();
    assert!(matches!(error, TransferError::MissingSource));
}

#[tokio::test]
async fn test_forbidden_is_permission() {
    let server = MockServer::start().await;
    Mock::given(path("/upload"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let transfer = HttpTransfer::new(Rc::new(config(&server)));
    let error = transfer.upload(png()).await.unwrap_err();
    assert!(matches!(error, TransferError::Status { status: 403 }));
    assert_eq!(error.kind(), ErrorKind::Permission);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network() {
    let config = Config::new("http://127.0.0.1:9/upload");
    let transfer = HttpTransfer::new(Rc::new(config));
    let error = transfer.upload(png()).await.unwrap_err();
    assert!(matches!(error, TransferError::Network(_)));
    assert_eq!(error.kind(), ErrorKind::Network);
}
