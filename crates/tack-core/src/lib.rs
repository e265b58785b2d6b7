//! tack-core: attachment uploads for a discussion composer, without a browser.
//!
//! This crate provides:
//! - `classify` / `validate` - file categories, size limits and markup
//! - `EditorAdapter` - placeholder insertion over plain and rich surfaces
//! - `UploadEngine` - per-file upload sessions and their resolution
//! - `BindingManager` - keeps listeners attached to the live composer
//! - `HttpTransfer` - multipart upload client
//! - `memory` - an in-memory host for driving all of the above (feature `memory`)

pub mod adapter;
pub mod binding;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod file;
pub mod host;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod session;
pub mod text;
pub mod transfer;
pub mod uploader;
pub mod validate;

pub use adapter::{
    EditorAdapter, PlainTextAdapter, RichDocumentAdapter, RichSurface, SurfaceKind,
    TextareaSurface,
};
pub use binding::{BindingManager, EditorContext};
pub use classify::{Category, accept_string, classify, markup_for};
pub use config::{Config, Locale, Settings, UploadParams};
pub use engine::{Spawn, UploadEngine, spawner};
pub use error::{ConfigError, ErrorKind, TransferError};
pub use file::{FileHandle, display_name};
pub use host::{
    EventHandler, EventKind, FilesCallback, HostEvent, HostPage, Lifecycle, Notifier,
    Subscription,
};
pub use session::{SessionId, UploadSession};
pub use transfer::{HttpTransfer, Transfer, TransferResult};
pub use uploader::Uploader;
pub use validate::{Rejection, validate};
