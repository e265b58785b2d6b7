//! Browser `File` handles.

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tack_core::{FileHandle, TransferError};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// A user-selected file. Name and type are read once up front.
pub struct DomFile {
    file: web_sys::File,
    name: String,
    content_type: String,
}

impl DomFile {
    pub fn new(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            content_type: file.type_(),
            file,
        }
    }
}

impl FileHandle for DomFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }

    fn read(&self) -> LocalBoxFuture<'static, Result<Bytes, TransferError>> {
        let buffer = JsFuture::from(self.file.array_buffer());
        async move {
            let buffer = buffer.await.map_err(|e| TransferError::Read(describe(&e)))?;
            Ok(Bytes::from(js_sys::Uint8Array::new(&buffer).to_vec()))
        }
        .boxed_local()
    }
}

/// Best-effort text for a thrown JS value.
fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
