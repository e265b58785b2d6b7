//! Error types and the user-facing failure taxonomy.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::Locale;

/// Category of an upload failure, as shown to the user.
///
/// `FileType` and `FileSize` come from validation and never reach a
/// placeholder. The rest are produced after a placeholder exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileType,
    FileSize,
    Network,
    Permission,
    Server,
    Format,
    Unknown,
}

impl ErrorKind {
    /// Stable machine name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::FileType => "filetype",
            ErrorKind::FileSize => "filesize",
            ErrorKind::Network => "network",
            ErrorKind::Permission => "permission",
            ErrorKind::Server => "server",
            ErrorKind::Format => "format",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Human label used inside failure markers.
    pub fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, ErrorKind::Network) => "network error",
            (Locale::En, ErrorKind::Server) => "server error",
            (Locale::En, ErrorKind::Permission) => "permission denied",
            (Locale::En, ErrorKind::Format) => "bad response",
            (Locale::En, ErrorKind::FileType) => "unsupported type",
            (Locale::En, ErrorKind::FileSize) => "file too large",
            (Locale::En, ErrorKind::Unknown) => "unknown error",
            (Locale::Zh, ErrorKind::Network) => "网络错误",
            (Locale::Zh, ErrorKind::Server) => "服务器错误",
            (Locale::Zh, ErrorKind::Permission) => "权限错误",
            (Locale::Zh, ErrorKind::Format) => "格式错误",
            (Locale::Zh, ErrorKind::FileType) => "类型不支持",
            (Locale::Zh, ErrorKind::FileSize) => "文件过大",
            (Locale::Zh, ErrorKind::Unknown) => "未知错误",
        }
    }

    /// Best-effort classification of a failure description.
    ///
    /// Checks are ordered; the first matching group wins.
    pub fn classify(description: &str) -> ErrorKind {
        let message = description.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

        if has(&["network", "failed to fetch"]) {
            ErrorKind::Network
        } else if has(&["401", "403", "permission"]) {
            ErrorKind::Permission
        } else if has(&["500", "503", "server"]) {
            ErrorKind::Server
        } else if has(&["format", "解析"]) {
            ErrorKind::Format
        } else if has(&["filetype"]) {
            ErrorKind::FileType
        } else if has(&["filesize"]) {
            ErrorKind::FileSize
        } else {
            ErrorKind::Unknown
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while transferring a file to the upload endpoint.
///
/// Display strings are what [`ErrorKind::classify`] inspects, so each variant
/// names its own kind and keeps lower-level detail in `source()`.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum TransferError {
    /// The request never produced a response.
    #[error("network error while contacting the upload endpoint")]
    #[diagnostic(code(tack::transfer::network))]
    Network(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("server returned HTTP {status}")]
    #[diagnostic(code(tack::transfer::status))]
    Status { status: u16 },

    /// The response body was not JSON.
    #[error("response format error: body is not valid JSON")]
    #[diagnostic(code(tack::transfer::format))]
    InvalidJson(#[source] serde_json::Error),

    /// The response JSON had no usable `src` field.
    #[error("response format error: no src in response")]
    #[diagnostic(
        code(tack::transfer::format),
        help("expected `src` in the first array element, under `data[0]`, or at the top level")
    )]
    MissingSource,

    /// The host could not hand over the file contents.
    ///
    /// The host's own message is kept for logs and never classified.
    #[error("could not read file contents")]
    #[diagnostic(code(tack::transfer::read))]
    Read(String),
}

impl TransferError {
    /// Taxonomy bucket for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Read(_) => ErrorKind::Unknown,
            other => ErrorKind::classify(&other.to_string()),
        }
    }

    /// Host-provided detail for read failures.
    pub fn detail(&self) -> Option<&str> {
        match self {
            TransferError::Read(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Errors raised while building a [`Config`](crate::Config).
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("upload endpoint is not configured")]
    #[diagnostic(code(tack::config::endpoint), help("set the `endpoint` option"))]
    MissingEndpoint,

    #[error("invalid settings")]
    #[diagnostic(code(tack::config::parse))]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_orders_groups() {
        assert_eq!(ErrorKind::classify("Failed to fetch"), ErrorKind::Network);
        assert_eq!(ErrorKind::classify("HTTP 403"), ErrorKind::Permission);
        assert_eq!(ErrorKind::classify("HTTP 503"), ErrorKind::Server);
        assert_eq!(ErrorKind::classify("解析响应数据失败"), ErrorKind::Format);
        assert_eq!(ErrorKind::classify("something odd"), ErrorKind::Unknown);
        // permission is checked before server
        assert_eq!(
            ErrorKind::classify("server returned HTTP 401"),
            ErrorKind::Permission
        );
    }

    #[test]
    fn test_transfer_error_kinds() {
        assert_eq!(TransferError::Status { status: 500 }.kind(), ErrorKind::Server);
        assert_eq!(TransferError::Status { status: 404 }.kind(), ErrorKind::Server);
        assert_eq!(
            TransferError::Status { status: 401 }.kind(),
            ErrorKind::Permission
        );
        assert_eq!(TransferError::MissingSource.kind(), ErrorKind::Format);
        assert_eq!(
            TransferError::Read("blob revoked".into()).kind(),
            ErrorKind::Unknown
        );

        let json = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(TransferError::InvalidJson(json).kind(), ErrorKind::Format);
    }

    #[test]
    fn test_read_failure_ignores_host_wording() {
        let chrome = TransferError::Read(
            "The requested file could not be read, typically due to permission problems \
             that have occurred after a reference to a file was acquired."
                .into(),
        );
        assert_eq!(chrome.kind(), ErrorKind::Unknown);
        assert_eq!(chrome.to_string(), "could not read file contents");
        assert!(chrome.detail().is_some_and(|d| d.contains("permission")));

        let firefox = TransferError::Read("NetworkError when attempting to fetch resource.".into());
        assert_eq!(firefox.kind(), ErrorKind::Unknown);
        assert_eq!(TransferError::Status { status: 500 }.detail(), None);
    }
}
