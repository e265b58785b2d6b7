//! Transfer client: sends one file to the upload endpoint.

use std::rc::Rc;

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::Config;
use crate::error::TransferError;
use crate::file::{FileHandle, display_name};

/// Canonical result of a successful transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferResult {
    /// Absolute URL of the uploaded asset.
    pub url: String,
    pub filename: String,
}

/// Something that can move a file to remote storage.
///
/// Futures are local: the engine runs on a single cooperative thread.
pub trait Transfer {
    fn upload(
        &self,
        file: Rc<dyn FileHandle>,
    ) -> LocalBoxFuture<'static, Result<TransferResult, TransferError>>;
}

/// Multipart HTTP upload against the configured endpoint.
#[derive(Clone)]
pub struct HttpTransfer {
    client: reqwest::Client,
    config: Rc<Config>,
}

impl HttpTransfer {
    pub fn new(config: Rc<Config>) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: Rc<Config>) -> Self {
        Self { client, config }
    }
}

impl Transfer for HttpTransfer {
    fn upload(
        &self,
        file: Rc<dyn FileHandle>,
    ) -> LocalBoxFuture<'static, Result<TransferResult, TransferError>> {
        let client = self.client.clone();
        let config = self.config.clone();
        async move { send(&client, &config, file.as_ref()).await }.boxed_local()
    }
}

async fn send(
    client: &reqwest::Client,
    config: &Config,
    file: &dyn FileHandle,
) -> Result<TransferResult, TransferError> {
    let filename = display_name(file);
    let data = file.read().await?;
    let form = Form::new().part("file", file_part(data, &filename, file.content_type()));

    let mut request = client
        .post(&config.endpoint)
        .query(&config.params.query_pairs())
        .multipart(form);
    if let Some(authorization) = config.authorization() {
        request = request.header(reqwest::header::AUTHORIZATION, authorization);
    }
    #[cfg(all(target_family = "wasm", target_os = "unknown"))]
    {
        request = request.fetch_credentials_omit();
    }

    let response = request.send().await.map_err(TransferError::Network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(TransferError::Network)?;
    let url = parse_response(&body, &config.assets_prefix)?;
    tracing::debug!(%url, %filename, "upload accepted");

    Ok(TransferResult { url, filename })
}

fn file_part(data: Bytes, filename: &str, content_type: &str) -> Part {
    let part = || Part::bytes(data.to_vec()).file_name(filename.to_owned());
    if content_type.is_empty() {
        return part();
    }
    part().mime_str(content_type).unwrap_or_else(|_| part())
}

/// Parse a response body into an absolute asset URL.
pub fn parse_response(body: &str, assets_prefix: &str) -> Result<String, TransferError> {
    let value: Value = serde_json::from_str(body).map_err(TransferError::InvalidJson)?;
    let src = extract_source(&value).ok_or(TransferError::MissingSource)?;
    Ok(normalize_url(src, assets_prefix))
}

/// Find `src` in one of the accepted response shapes:
/// `[{"src"}]`, `{"data": [{"src"}]}`, or `{"src"}`.
pub fn extract_source(value: &Value) -> Option<&str> {
    let src = match value {
        Value::Array(items) => items.first().and_then(|item| item.get("src")),
        other => other
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|item| item.get("src"))
            .or_else(|| other.get("src")),
    };
    src.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Absolute URLs pass through; anything else gets the asset prefix.
///
/// A slash on both sides of the join is collapsed into one.
pub fn normalize_url(src: &str, assets_prefix: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_owned();
    }
    match (assets_prefix.strip_suffix('/'), src.starts_with('/')) {
        (Some(prefix), true) => format!("{prefix}{src}"),
        _ => format!("{assets_prefix}{src}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_source_shapes() {
        assert_eq!(extract_source(&json!([{"src": "/a"}])), Some("/a"));
        assert_eq!(extract_source(&json!({"data": [{"src": "/b"}]})), Some("/b"));
        assert_eq!(extract_source(&json!({"src": "/c"})), Some("/c"));
        assert_eq!(
            extract_source(&json!({"data": [{"name": "x"}], "src": "/d"})),
            Some("/d")
        );
        assert_eq!(extract_source(&json!([])), None);
        assert_eq!(extract_source(&json!({"src": ""})), None);
        assert_eq!(extract_source(&json!({"ok": true})), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://img.x/a.png", "https://cdn.x"),
            "https://img.x/a.png"
        );
        assert_eq!(normalize_url("/u/a.png", "https://cdn.x/"), "https://cdn.x/u/a.png");
        assert_eq!(normalize_url("u/a.png", "https://cdn.x/"), "https://cdn.x/u/a.png");
        assert_eq!(normalize_url("/u/a.png", "https://cdn.x"), "https://cdn.x/u/a.png");
        assert_eq!(normalize_url("/u/a.png", ""), "/u/a.png");
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(matches!(
            parse_response("<html>", ""),
            Err(TransferError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_response(r#"{"data": []}"#, ""),
            Err(TransferError::MissingSource)
        ));
    }
}
