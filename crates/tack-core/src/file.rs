//! Host-provided file handles.

use bytes::Bytes;
use futures_util::future::LocalBoxFuture;

use crate::error::TransferError;

/// A file selected by the user, as exposed by the host.
///
/// Metadata is available synchronously so validation never suspends; the
/// contents are only read once a transfer starts.
pub trait FileHandle {
    /// Original file name. Empty when the host did not provide one.
    fn name(&self) -> &str;

    /// Declared content type (e.g. `image/png`). May be empty.
    fn content_type(&self) -> &str;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// Read the full contents.
    fn read(&self) -> LocalBoxFuture<'static, Result<Bytes, TransferError>>;
}

/// Name to use when rendering or uploading `file`.
///
/// Falls back to `file_<unix-millis>` for unnamed files (pasted screenshots
/// usually are).
pub fn display_name(file: &dyn FileHandle) -> String {
    let name = file.name();
    if name.is_empty() {
        format!("file_{}", unix_millis())
    } else {
        name.to_owned()
    }
}

pub(crate) fn unix_millis() -> u128 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
