//! Upload engine: the per-file state machine.
//!
//! A file moves `Received → Validated → PlaceholderInserted → Transferring`
//! and ends either resolved with markup or resolved with a failure marker.
//! Every session is keyed by its id in the pending map; taking it out of the
//! map is what makes resolution happen at most once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::adapter::EditorAdapter;
use crate::classify::{failure_label, markup_for, pad_block, placeholder_label};
use crate::config::Config;
use crate::error::TransferError;
use crate::file::FileHandle;
use crate::host::Notifier;
use crate::session::{SessionId, UploadSession};
use crate::transfer::{Transfer, TransferResult};
use crate::validate::{rejection_message, validate};

/// Runs a future to completion on the control thread.
pub trait Spawn {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

impl<F> Spawn for F
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        self(future)
    }
}

/// Wrap a spawning function, e.g. `spawner(|f| { tokio::task::spawn_local(f); })`.
pub fn spawner<F>(spawn: F) -> Rc<dyn Spawn>
where
    F: Fn(LocalBoxFuture<'static, ()>) + 'static,
{
    Rc::new(spawn)
}

/// Orchestrates uploads and resolves their placeholders.
pub struct UploadEngine {
    config: Rc<Config>,
    transfer: Rc<dyn Transfer>,
    spawner: Rc<dyn Spawn>,
    notifier: Rc<dyn Notifier>,
    pending: RefCell<HashMap<SessionId, UploadSession>>,
    /// Adapter of the currently bound context, if any.
    current: RefCell<Option<Rc<dyn EditorAdapter>>>,
}

impl UploadEngine {
    pub fn new(
        config: Rc<Config>,
        transfer: Rc<dyn Transfer>,
        spawner: Rc<dyn Spawn>,
        notifier: Rc<dyn Notifier>,
    ) -> Rc<Self> {
        Rc::new(Self {
            config,
            transfer,
            spawner,
            notifier,
            pending: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set the adapter of the currently bound context.
    pub fn set_current(&self, adapter: Option<Rc<dyn EditorAdapter>>) {
        *self.current.borrow_mut() = adapter;
    }

    pub fn current(&self) -> Option<Rc<dyn EditorAdapter>> {
        self.current.borrow().clone()
    }

    /// Number of sessions still transferring.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether `id` still awaits resolution.
    pub fn is_pending(&self, id: &SessionId) -> bool {
        self.pending.borrow().contains_key(id)
    }

    /// Start an upload for each file, independently.
    ///
    /// Does nothing when `adapter` is detached or `files` is empty.
    pub fn process_files(
        self: &Rc<Self>,
        files: Vec<Rc<dyn FileHandle>>,
        adapter: Rc<dyn EditorAdapter>,
    ) -> Vec<SessionId> {
        if files.is_empty() || !adapter.is_usable() {
            return Vec::new();
        }
        files
            .into_iter()
            .filter_map(|file| self.upload_file(file, adapter.clone()))
            .collect()
    }

    fn upload_file(
        self: &Rc<Self>,
        file: Rc<dyn FileHandle>,
        adapter: Rc<dyn EditorAdapter>,
    ) -> Option<SessionId> {
        let category = match validate(file.as_ref(), self.config.max_file_size) {
            Ok(category) => category,
            Err(rejection) => {
                tracing::debug!(kind = %rejection.kind(), name = file.name(), "file rejected");
                self.notifier.alert(&rejection_message(
                    file.as_ref(),
                    rejection,
                    self.config.max_file_size_mb(),
                    self.config.locale,
                ));
                return None;
            }
        };

        let id = SessionId::generate();
        let placeholder = placeholder_label(Some(category), &id, self.config.locale);

        adapter.focus();
        adapter.insert_placeholder(&pad_block(&placeholder));

        self.pending.borrow_mut().insert(
            id.clone(),
            UploadSession {
                id: id.clone(),
                file: file.clone(),
                category,
                adapter,
                placeholder,
            },
        );
        tracing::debug!(%id, name = file.name(), "upload started");

        let transfer = self.transfer.upload(file);
        let engine = self.clone();
        let session_id = id.clone();
        self.spawner.spawn_local(
            async move {
                let result = transfer.await;
                engine.settle(&session_id, result);
            }
            .boxed_local(),
        );

        Some(id)
    }

    fn settle(&self, id: &SessionId, result: Result<TransferResult, TransferError>) {
        let Some(session) = self.pending.borrow_mut().remove(id) else {
            tracing::warn!(%id, "session already resolved");
            return;
        };

        let replacement = match result {
            Ok(uploaded) => {
                tracing::debug!(%id, url = %uploaded.url, "upload succeeded");
                markup_for(&uploaded.filename, Some(session.category), &uploaded.url)
            }
            Err(error) => {
                let kind = error.kind();
                tracing::warn!(
                    %id,
                    %kind,
                    error = %error,
                    detail = ?error.detail(),
                    "upload failed"
                );
                failure_label(id, kind, self.config.locale)
            }
        };

        self.resolve(&session, &replacement);
    }

    /// Put `replacement` where the session's placeholder is, wherever the
    /// placeholder now lives. Appends when it can't be found.
    fn resolve(&self, session: &UploadSession, replacement: &str) {
        let current = self.current();

        let mut candidates: Vec<Rc<dyn EditorAdapter>> = Vec::with_capacity(2);
        if session.adapter.is_usable() {
            candidates.push(session.adapter.clone());
        }
        if let Some(current) = &current {
            if !Rc::ptr_eq(current, &session.adapter) && current.is_usable() {
                candidates.push(current.clone());
            }
        }

        if candidates
            .iter()
            .any(|adapter| adapter.replace_placeholder(&session.placeholder, replacement))
        {
            return;
        }

        let fallback = current
            .into_iter()
            .chain(std::iter::once(session.adapter.clone()))
            .find(|adapter| adapter.is_usable());
        match fallback {
            Some(adapter) => {
                tracing::debug!(id = %session.id, surface = %adapter.kind(), "placeholder gone, appending");
                adapter.append_content(replacement);
            }
            None => {
                tracing::warn!(id = %session.id, "no usable surface, result dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{PlainTextAdapter, RichDocumentAdapter, TextareaSurface};
    use crate::memory::{MemoryFile, MemoryPage, MemoryRichDocument, MemoryTextarea};

    /// Transfers that never finish on their own; tests settle sessions by hand.
    struct Stalled;

    impl Transfer for Stalled {
        fn upload(
            &self,
            _file: Rc<dyn FileHandle>,
        ) -> LocalBoxFuture<'static, Result<TransferResult, TransferError>> {
            futures_util::future::pending().boxed_local()
        }
    }

    fn make_engine(page: &MemoryPage) -> Rc<UploadEngine> {
        UploadEngine::new(
            Rc::new(Config::new("https://up.x/upload")),
            Rc::new(Stalled),
            spawner(|_future| {}),
            Rc::new(page.clone()),
        )
    }

    fn plain(textarea: &MemoryTextarea) -> Rc<dyn EditorAdapter> {
        Rc::new(PlainTextAdapter::new(textarea.clone()))
    }

    fn uploaded(filename: &str) -> Result<TransferResult, TransferError> {
        Ok(TransferResult {
            url: "https://cdn.x/u/a.png".into(),
            filename: filename.into(),
        })
    }

    fn png() -> Rc<dyn FileHandle> {
        MemoryFile::sized("a.png", "image/png", 10).shared()
    }

    #[test]
    fn test_placeholder_then_resolve_once() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("");

        let ids = engine.process_files(vec![png()], plain(&textarea));
        assert_eq!(ids.len(), 1);
        let id = &ids[0];
        assert!(textarea.value().contains(&format!("![uploading...{id}]")));
        assert!(engine.is_pending(id));
        let placeholder = engine.pending.borrow()[id].placeholder.clone();

        engine.settle(id, uploaded("a.png"));
        assert_eq!(textarea.value(), "\n![a.png](https://cdn.x/u/a.png)\n\n");
        assert_eq!(engine.pending_count(), 0);

        // the same placeholder text typed back in is left alone
        let resolved = format!("{}{placeholder}", textarea.value());
        textarea.set_value(&resolved);
        engine.settle(id, Err(TransferError::Status { status: 500 }));
        assert_eq!(textarea.value(), resolved);
        assert!(!textarea.value().contains("upload-failed"));
    }

    #[test]
    fn test_failed_rich_edit_falls_back_to_append() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let doc = MemoryRichDocument::with_nodes(&["draft"]);
        let adapter: Rc<dyn EditorAdapter> = Rc::new(RichDocumentAdapter::new(doc.clone()));

        let id = engine.process_files(vec![png()], adapter).remove(0);
        let placeholder = engine.pending.borrow()[&id].placeholder.clone();
        assert!(doc.text().contains(&placeholder));

        doc.set_reject_edits(true);
        engine.settle(&id, uploaded("a.png"));
        assert!(doc.text().ends_with("![a.png](https://cdn.x/u/a.png)\n\n"));
        assert_eq!(engine.pending_count(), 0);
    }

    #[test]
    fn test_failure_marker() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("");

        let id = engine.process_files(vec![png()], plain(&textarea)).remove(0);
        engine.settle(&id, Err(TransferError::Status { status: 403 }));
        assert_eq!(
            textarea.value(),
            format!("\n[upload-failed(permission denied)-{id}]\n\n")
        );
    }

    #[test]
    fn test_rejected_files_alert_without_placeholder() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("draft");

        let files = vec![
            MemoryFile::sized("a.zip", "application/zip", 10).shared(),
            MemoryFile::sized("big.mp4", "video/mp4", 30 * 1024 * 1024).shared(),
            png(),
        ];
        let ids = engine.process_files(files, plain(&textarea));

        assert_eq!(ids.len(), 1);
        assert_eq!(page.alerts().len(), 2);
        assert_eq!(textarea.value().matches("uploading...").count(), 1);
    }

    #[test]
    fn test_nothing_happens_on_detached_surface() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("");
        textarea.detach();

        assert!(engine.process_files(vec![png()], plain(&textarea)).is_empty());
        assert!(engine.process_files(Vec::new(), plain(&textarea)).is_empty());
        assert_eq!(engine.pending_count(), 0);
        assert!(page.alerts().is_empty());
    }

    #[test]
    fn test_resolves_in_current_surface_after_swap() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let old = MemoryTextarea::with_value("");

        let id = engine.process_files(vec![png()], plain(&old)).remove(0);

        // the host re-rendered the composer, carrying the draft along
        let new = MemoryTextarea::with_value(&old.value());
        old.detach();
        engine.set_current(Some(plain(&new)));

        engine.settle(&id, uploaded("a.png"));
        assert_eq!(new.value(), "\n![a.png](https://cdn.x/u/a.png)\n\n");
    }

    #[test]
    fn test_appends_when_placeholder_deleted() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("");
        let adapter = plain(&textarea);
        engine.set_current(Some(adapter.clone()));

        let id = engine.process_files(vec![png()], adapter).remove(0);
        textarea.set_value("rewritten");

        engine.settle(&id, uploaded("a.png"));
        assert_eq!(
            textarea.value(),
            "rewritten\n\n![a.png](https://cdn.x/u/a.png)\n\n"
        );
    }

    #[test]
    fn test_result_dropped_without_any_surface() {
        let page = MemoryPage::new();
        let engine = make_engine(&page);
        let textarea = MemoryTextarea::with_value("");

        let id = engine.process_files(vec![png()], plain(&textarea)).remove(0);
        textarea.detach();

        engine.settle(&id, uploaded("a.png"));
        assert!(!engine.is_pending(&id));
        assert!(textarea.value().contains("uploading..."));
    }
}
