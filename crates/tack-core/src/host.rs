//! Host page abstraction.
//!
//! The host owns the page tree and its events. These traits describe what the
//! binding manager needs from it: locating the composition surface, attaching
//! capture listeners, observing structural changes, and opening a file
//! picker. Every registration returns a [`Subscription`] that releases it on
//! drop.

use std::rc::Rc;

use crate::adapter::EditorAdapter;
use crate::file::FileHandle;

/// User input events the binding listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Paste,
    Drop,
    DragOver,
    Click,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Paste => "paste",
            EventKind::Drop => "drop",
            EventKind::DragOver => "dragover",
            EventKind::Click => "click",
        }
    }
}

/// Composer lifecycle signals emitted by the host application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Opened,
    Recovered,
    Closed,
    Destroyed,
}

/// An input event delivered to a capture listener.
pub trait HostEvent {
    /// Files carried by the event (clipboard file items, dropped files).
    fn files(&self) -> Vec<Rc<dyn FileHandle>>;

    /// Whether the event carries files at all. Cheaper than `files()` and
    /// available during drag-over, when file contents are not yet exposed.
    fn has_files(&self) -> bool;

    fn prevent_default(&self);

    /// Stop the event reaching any other listener.
    fn stop_propagation(&self);
}

pub type EventHandler = Rc<dyn Fn(&dyn HostEvent)>;
pub type FilesCallback = Box<dyn FnOnce(Vec<Rc<dyn FileHandle>>)>;

/// Blocking user-visible notices.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// The page hosting the composition surface.
///
/// `Element` equality must be reference identity: two handles are equal only
/// when they point at the same node.
pub trait HostPage: Notifier {
    type Element: Clone + PartialEq + 'static;

    /// The composition root, if the composer exists.
    fn composition_root(&self) -> Option<Self::Element>;

    /// Whether the root is in its visually closed state.
    fn is_closed(&self, root: &Self::Element) -> bool;

    fn rich_surface(&self, root: &Self::Element) -> Option<Self::Element>;

    fn plain_surface(&self, root: &Self::Element) -> Option<Self::Element>;

    fn toolbar(&self, root: &Self::Element) -> Option<Self::Element>;

    fn upload_trigger(&self, root: &Self::Element) -> Option<Self::Element>;

    /// Wrap a rich surface. `None` if the element can't be driven as one.
    fn rich_adapter(&self, editor: &Self::Element) -> Option<Rc<dyn EditorAdapter>>;

    /// Wrap a plain surface. `None` if the element can't be driven as one.
    fn plain_adapter(&self, editor: &Self::Element) -> Option<Rc<dyn EditorAdapter>>;

    /// Attach a capture-phase listener.
    fn listen(&self, target: &Self::Element, kind: EventKind, handler: EventHandler)
    -> Subscription;

    /// Observe child list, subtree and class attribute changes under `target`.
    fn observe(&self, target: &Self::Element, callback: Rc<dyn Fn()>) -> Subscription;

    /// Observe structural changes anywhere on the page.
    fn observe_page(&self, callback: Rc<dyn Fn()>) -> Subscription;

    /// Subscribe to composer lifecycle signals.
    fn on_lifecycle(&self, callback: Rc<dyn Fn(Lifecycle)>) -> Subscription;

    /// Open a multi-select file picker. `on_pick` runs once if the user picks
    /// at least one file.
    fn pick_files(&self, accept: &str, on_pick: FilesCallback) -> Subscription;

    /// Make the upload trigger visible; hosts may hide it by default.
    fn reveal(&self, _element: &Self::Element) {}
}

/// Releases a host registration when dropped.
#[must_use = "dropping a subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Run `release` when this subscription is dropped.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Keep `guard` alive until this subscription is dropped.
    pub fn guard<T: 'static>(guard: T) -> Self {
        Self::new(move || drop(guard))
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
