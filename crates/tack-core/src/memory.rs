//! In-memory host, surfaces and files.
//!
//! Mirrors the browser host closely enough to drive the binding manager and
//! engine end to end without a page: structural mutations fire observers
//! synchronously, listeners are keyed by element identity, and dropping a
//! [`Subscription`] really removes the registration.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, ready};

use crate::adapter::{
    EditorAdapter, PlainTextAdapter, RichDocumentAdapter, RichSurface, TextareaSurface,
};
use crate::error::TransferError;
use crate::file::FileHandle;
use crate::host::{
    EventHandler, EventKind, FilesCallback, HostEvent, HostPage, Lifecycle, Notifier, Subscription,
};
use crate::text::{len_chars, splice};

/// A file held in memory.
#[derive(Clone, Debug)]
pub struct MemoryFile {
    name: String,
    content_type: String,
    size: u64,
    data: Bytes,
    read_error: Option<String>,
}

impl MemoryFile {
    pub fn new(name: &str, content_type: &str, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.to_owned(),
            content_type: content_type.to_owned(),
            size: data.len() as u64,
            data,
            read_error: None,
        }
    }

    /// Reports `size` without holding that many bytes. Reads yield nothing.
    pub fn sized(name: &str, content_type: &str, size: u64) -> Self {
        Self {
            size,
            ..Self::new(name, content_type, Bytes::new())
        }
    }

    /// Reading the contents fails with `message`.
    pub fn unreadable(mut self, message: &str) -> Self {
        self.read_error = Some(message.to_owned());
        self
    }

    pub fn shared(self) -> Rc<dyn FileHandle> {
        Rc::new(self)
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read(&self) -> LocalBoxFuture<'static, Result<Bytes, TransferError>> {
        let result = match &self.read_error {
            Some(message) => Err(TransferError::Read(message.clone())),
            None => Ok(self.data.clone()),
        };
        ready(result).boxed_local()
    }
}

#[derive(Debug)]
struct TextareaState {
    value: RefCell<String>,
    selection: RefCell<Range<usize>>,
    scroll_top: Cell<i32>,
    connected: Cell<bool>,
    focused: Cell<bool>,
    changes: Cell<usize>,
}

/// A textarea. Clones share the same buffer.
#[derive(Clone, Debug)]
pub struct MemoryTextarea {
    state: Rc<TextareaState>,
}

impl MemoryTextarea {
    /// A connected textarea holding `value`, caret at the end.
    pub fn with_value(value: &str) -> Self {
        let end = len_chars(value);
        Self {
            state: Rc::new(TextareaState {
                value: RefCell::new(value.to_owned()),
                selection: RefCell::new(end..end),
                scroll_top: Cell::new(0),
                connected: Cell::new(true),
                focused: Cell::new(false),
                changes: Cell::new(0),
            }),
        }
    }

    /// Number of change notifications emitted so far.
    pub fn change_count(&self) -> usize {
        self.state.changes.get()
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused.get()
    }

    /// Remove the textarea from the page.
    pub fn detach(&self) {
        self.state.connected.set(false);
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for MemoryTextarea {
    fn default() -> Self {
        Self::with_value("")
    }
}

impl TextareaSurface for MemoryTextarea {
    fn is_connected(&self) -> bool {
        self.state.connected.get()
    }

    fn focus(&self) {
        self.state.focused.set(true);
    }

    fn value(&self) -> String {
        self.state.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        let end = len_chars(value);
        *self.state.value.borrow_mut() = value.to_owned();
        // Like the DOM, assigning the value puts the caret at the end.
        *self.state.selection.borrow_mut() = end..end;
    }

    fn selection(&self) -> Range<usize> {
        self.state.selection.borrow().clone()
    }

    fn set_selection(&self, selection: Range<usize>) {
        *self.state.selection.borrow_mut() = selection;
    }

    fn scroll_top(&self) -> i32 {
        self.state.scroll_top.get()
    }

    fn set_scroll_top(&self, scroll_top: i32) {
        self.state.scroll_top.set(scroll_top);
    }

    fn notify_changed(&self) {
        self.state.changes.set(self.state.changes.get() + 1);
    }
}

/// Stable handle to a text node of a [`MemoryRichDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug)]
struct TextNode {
    id: NodeId,
    text: String,
}

#[derive(Debug)]
struct RichState {
    nodes: RefCell<Vec<TextNode>>,
    caret: Cell<Option<(NodeId, usize)>>,
    native_insert: Cell<bool>,
    connected: Cell<bool>,
    focused: Cell<bool>,
    changes: Cell<usize>,
    next_id: Cell<u64>,
    reject_edits: Cell<bool>,
}

/// A structured document made of flat text nodes. Clones share the document.
#[derive(Clone, Debug)]
pub struct MemoryRichDocument {
    state: Rc<RichState>,
}

impl MemoryRichDocument {
    /// A connected document with one text node per entry and no caret.
    pub fn with_nodes(texts: &[&str]) -> Self {
        let doc = Self {
            state: Rc::new(RichState {
                nodes: RefCell::new(Vec::new()),
                caret: Cell::new(None),
                native_insert: Cell::new(true),
                connected: Cell::new(true),
                focused: Cell::new(false),
                changes: Cell::new(0),
                next_id: Cell::new(0),
                reject_edits: Cell::new(false),
            }),
        };
        let nodes = texts.iter().map(|text| doc.new_node(text)).collect();
        *doc.state.nodes.borrow_mut() = nodes;
        doc
    }

    /// Put the caret at char `offset` of the node at `index`.
    pub fn set_caret(&self, index: usize, offset: usize) {
        let id = self.state.nodes.borrow().get(index).map(|node| node.id);
        self.state.caret.set(id.map(|id| (id, offset)));
    }

    pub fn clear_caret(&self) {
        self.state.caret.set(None);
    }

    pub fn caret(&self) -> Option<(NodeId, usize)> {
        self.state.caret.get()
    }

    /// Toggle support for the native insert-text command.
    pub fn set_native_insert(&self, supported: bool) {
        self.state.native_insert.set(supported);
    }

    /// Make in-node replacement fail, as a DOM range error would.
    pub fn set_reject_edits(&self, reject: bool) {
        self.state.reject_edits.set(reject);
    }

    pub fn node_count(&self) -> usize {
        self.state.nodes.borrow().len()
    }

    pub fn text(&self) -> String {
        self.state
            .nodes
            .borrow()
            .iter()
            .map(|node| node.text.as_str())
            .collect()
    }

    pub fn change_count(&self) -> usize {
        self.state.changes.get()
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused.get()
    }

    pub fn detach(&self) {
        self.state.connected.set(false);
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn new_node(&self, text: &str) -> TextNode {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        TextNode {
            id: NodeId(id),
            text: text.to_owned(),
        }
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.state.nodes.borrow().iter().position(|node| node.id == id)
    }

    /// Split the node at `index` around `range`, putting `text` in a node of
    /// its own between the halves. Empty halves are dropped.
    fn split_insert(&self, index: usize, range: Range<usize>, text: &str) -> NodeId {
        let inserted = self.new_node(text);
        let id = inserted.id;
        let mut nodes = self.state.nodes.borrow_mut();
        let original = nodes.remove(index);

        let end = range.end.min(len_chars(&original.text));
        let start = range.start.min(end);
        let before = splice(&original.text, start, len_chars(&original.text), "");
        let after = splice(&original.text, 0, end, "");

        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            replacement.push(TextNode {
                id: original.id,
                text: before,
            });
        }
        replacement.push(inserted);
        if !after.is_empty() {
            replacement.push(self.new_node(&after));
        }
        nodes.splice(index..index, replacement);
        id
    }
}

impl RichSurface for MemoryRichDocument {
    type Node = NodeId;

    fn is_connected(&self) -> bool {
        self.state.connected.get()
    }

    fn focus(&self) {
        self.state.focused.set(true);
    }

    fn text_nodes(&self) -> Vec<NodeId> {
        self.state.nodes.borrow().iter().map(|node| node.id).collect()
    }

    fn node_text(&self, node: &NodeId) -> String {
        self.state
            .nodes
            .borrow()
            .iter()
            .find(|candidate| candidate.id == *node)
            .map(|candidate| candidate.text.clone())
            .unwrap_or_default()
    }

    fn replace_in_node(&self, node: &NodeId, range: Range<usize>, text: &str) -> Option<NodeId> {
        if self.state.reject_edits.get() {
            return None;
        }
        let index = self.index_of(*node)?;
        Some(self.split_insert(index, range, text))
    }

    fn place_caret_after(&self, node: &NodeId) {
        let len = len_chars(&self.node_text(node));
        self.state.caret.set(Some((*node, len)));
    }

    fn native_insert_text(&self, text: &str) -> bool {
        if !self.state.native_insert.get() {
            return false;
        }
        let Some((id, offset)) = self.state.caret.get() else {
            return false;
        };
        let mut nodes = self.state.nodes.borrow_mut();
        let Some(node) = nodes.iter_mut().find(|node| node.id == id) else {
            return false;
        };
        let offset = offset.min(len_chars(&node.text));
        node.text = splice(&node.text, offset, offset, text);
        self.state.caret.set(Some((id, offset + len_chars(text))));
        true
    }

    fn insert_at_selection(&self, text: &str) -> bool {
        let Some((id, offset)) = self.state.caret.get() else {
            return false;
        };
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let inserted = self.split_insert(index, offset..offset, text);
        self.place_caret_after(&inserted);
        true
    }

    fn append_text(&self, text: &str) {
        let node = self.new_node(text);
        self.state.nodes.borrow_mut().push(node);
    }

    fn move_caret_to_end(&self) {
        let end = self
            .state
            .nodes
            .borrow()
            .last()
            .map(|node| (node.id, len_chars(&node.text)));
        self.state.caret.set(end);
    }

    fn notify_changed(&self) {
        self.state.changes.set(self.state.changes.get() + 1);
    }
}

/// What a [`MemoryElement`] is.
#[derive(Clone, Debug)]
pub enum ElementKind {
    Root,
    Toolbar,
    UploadTrigger,
    Textarea(MemoryTextarea),
    Rich(MemoryRichDocument),
}

#[derive(Debug)]
struct ElementData {
    kind: ElementKind,
    visible: Cell<bool>,
}

/// A page element. Equality is identity.
#[derive(Clone, Debug)]
pub struct MemoryElement {
    data: Rc<ElementData>,
}

impl MemoryElement {
    fn new(kind: ElementKind) -> Self {
        Self {
            data: Rc::new(ElementData {
                kind,
                visible: Cell::new(false),
            }),
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.data.kind
    }

    /// Whether the element has been revealed.
    pub fn is_visible(&self) -> bool {
        self.data.visible.get()
    }

    pub fn textarea(&self) -> Option<&MemoryTextarea> {
        match &self.data.kind {
            ElementKind::Textarea(textarea) => Some(textarea),
            _ => None,
        }
    }

    pub fn rich(&self) -> Option<&MemoryRichDocument> {
        match &self.data.kind {
            ElementKind::Rich(doc) => Some(doc),
            _ => None,
        }
    }

    fn detach(&self) {
        match &self.data.kind {
            ElementKind::Textarea(textarea) => textarea.detach(),
            ElementKind::Rich(doc) => doc.detach(),
            _ => {}
        }
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for MemoryElement {}

/// An input event carrying in-memory files.
#[derive(Default)]
pub struct MemoryEvent {
    files: Vec<Rc<dyn FileHandle>>,
    carries_files: bool,
    prevented: Cell<bool>,
    stopped: Cell<bool>,
}

impl MemoryEvent {
    pub fn with_files(files: Vec<Rc<dyn FileHandle>>) -> Self {
        Self {
            carries_files: !files.is_empty(),
            files,
            ..Self::default()
        }
    }

    /// An event without files, e.g. a plain text paste.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A drag-over that advertises files without exposing them.
    pub fn dragging_files() -> Self {
        Self {
            carries_files: true,
            ..Self::default()
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl HostEvent for MemoryEvent {
    fn files(&self) -> Vec<Rc<dyn FileHandle>> {
        self.files.clone()
    }

    fn has_files(&self) -> bool {
        self.carries_files
    }

    fn prevent_default(&self) {
        self.prevented.set(true);
    }

    fn stop_propagation(&self) {
        self.stopped.set(true);
    }
}

struct Listener {
    id: u64,
    target: MemoryElement,
    kind: EventKind,
    handler: EventHandler,
}

struct Observer {
    id: u64,
    callback: Rc<dyn Fn()>,
}

struct Picker {
    id: u64,
    accept: String,
    on_pick: Option<FilesCallback>,
}

#[derive(Default)]
struct PageState {
    root: Option<MemoryElement>,
    closed: bool,
    rich: Option<MemoryElement>,
    plain: Option<MemoryElement>,
    toolbar: Option<MemoryElement>,
    trigger: Option<MemoryElement>,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    lifecycle: Vec<(u64, Rc<dyn Fn(Lifecycle)>)>,
    pickers: Vec<Picker>,
    alerts: Vec<String>,
    next_id: u64,
}

impl PageState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory page hosting at most one composer. Clones share the page.
#[derive(Clone, Default)]
pub struct MemoryPage {
    state: Rc<RefCell<PageState>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the composer with a plain text surface, replacing any surface.
    pub fn open_plain(&self, value: &str) -> MemoryTextarea {
        let textarea = MemoryTextarea::with_value(value);
        self.mutate(|state| {
            Self::clear_surfaces(state);
            Self::ensure_root(state);
            state.plain = Some(MemoryElement::new(ElementKind::Textarea(textarea.clone())));
        });
        textarea
    }

    /// Open the composer with a rich surface, replacing any surface.
    pub fn open_rich(&self, nodes: &[&str]) -> MemoryRichDocument {
        let doc = MemoryRichDocument::with_nodes(nodes);
        self.mutate(|state| {
            Self::clear_surfaces(state);
            Self::ensure_root(state);
            state.rich = Some(MemoryElement::new(ElementKind::Rich(doc.clone())));
        });
        doc
    }

    /// Render a rich surface next to the existing plain one.
    pub fn add_rich(&self, nodes: &[&str]) -> MemoryRichDocument {
        let doc = MemoryRichDocument::with_nodes(nodes);
        self.mutate(|state| {
            Self::ensure_root(state);
            if let Some(old) = state.rich.take() {
                old.detach();
            }
            state.rich = Some(MemoryElement::new(ElementKind::Rich(doc.clone())));
        });
        doc
    }

    pub fn add_toolbar(&self) -> MemoryElement {
        let toolbar = MemoryElement::new(ElementKind::Toolbar);
        self.mutate(|state| {
            Self::ensure_root(state);
            state.toolbar = Some(toolbar.clone());
        });
        toolbar
    }

    pub fn add_upload_trigger(&self) -> MemoryElement {
        let trigger = MemoryElement::new(ElementKind::UploadTrigger);
        self.mutate(|state| {
            Self::ensure_root(state);
            state.trigger = Some(trigger.clone());
        });
        trigger
    }

    /// Toggle the root's closed state.
    pub fn set_closed(&self, closed: bool) {
        self.mutate(|state| state.closed = closed);
    }

    /// Remove the composer and everything in it.
    pub fn remove_composer(&self) {
        self.mutate(|state| {
            Self::clear_surfaces(state);
            state.root = None;
            state.toolbar = None;
            state.trigger = None;
            state.closed = false;
        });
    }

    /// Fire observers without changing anything, as hosts do redundantly.
    pub fn notify_structure_changed(&self) {
        self.fire_observers();
    }

    pub fn emit(&self, signal: Lifecycle) {
        let callbacks: Vec<_> = self
            .state
            .borrow()
            .lifecycle
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(signal);
        }
    }

    pub fn root(&self) -> Option<MemoryElement> {
        self.state.borrow().root.clone()
    }

    /// The editor element a user would interact with: rich over plain.
    pub fn editor(&self) -> Option<MemoryElement> {
        let state = self.state.borrow();
        state.rich.clone().or_else(|| state.plain.clone())
    }

    pub fn upload_trigger_element(&self) -> Option<MemoryElement> {
        self.state.borrow().trigger.clone()
    }

    /// Deliver `event` along `path`, outermost first, as capture listeners
    /// see it. Stops after the element whose listener stopped propagation.
    pub fn dispatch(&self, path: &[MemoryElement], kind: EventKind, event: &MemoryEvent) {
        for target in path {
            let handlers: Vec<EventHandler> = self
                .state
                .borrow()
                .listeners
                .iter()
                .filter(|listener| listener.kind == kind && listener.target == *target)
                .map(|listener| listener.handler.clone())
                .collect();
            for handler in handlers {
                handler(event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
    }

    /// Paste `files` into the editor.
    pub fn paste(&self, files: Vec<Rc<dyn FileHandle>>) -> MemoryEvent {
        let event = MemoryEvent::with_files(files);
        if let Some(editor) = self.editor() {
            self.dispatch(&[editor], EventKind::Paste, &event);
        }
        event
    }

    /// Drop `files` onto the editor; the root sees the event first.
    pub fn drop_files(&self, files: Vec<Rc<dyn FileHandle>>) -> MemoryEvent {
        let event = MemoryEvent::with_files(files);
        self.dispatch(&self.editor_path(), EventKind::Drop, &event);
        event
    }

    pub fn drag_over(&self, event: MemoryEvent) -> MemoryEvent {
        self.dispatch(&self.editor_path(), EventKind::DragOver, &event);
        event
    }

    pub fn click_upload_trigger(&self) -> MemoryEvent {
        let event = MemoryEvent::empty();
        if let Some(trigger) = self.upload_trigger_element() {
            self.dispatch(&[trigger], EventKind::Click, &event);
        }
        event
    }

    /// Finish the most recently opened file picker with `files`.
    ///
    /// Returns `false` if no picker is open.
    pub fn complete_pick(&self, files: Vec<Rc<dyn FileHandle>>) -> bool {
        if files.is_empty() {
            return false;
        }
        let on_pick = self
            .state
            .borrow_mut()
            .pickers
            .last_mut()
            .and_then(|picker| picker.on_pick.take());
        match on_pick {
            Some(on_pick) => {
                on_pick(files);
                true
            }
            None => false,
        }
    }

    /// `accept` filter of the most recently opened picker.
    pub fn picker_accept(&self) -> Option<String> {
        self.state
            .borrow()
            .pickers
            .last()
            .map(|picker| picker.accept.clone())
    }

    pub fn open_pickers(&self) -> usize {
        self.state.borrow().pickers.len()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.state.borrow().alerts.clone()
    }

    /// Active listeners of `kind`, across all elements.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn lifecycle_count(&self) -> usize {
        self.state.borrow().lifecycle.len()
    }

    fn editor_path(&self) -> Vec<MemoryElement> {
        self.root().into_iter().chain(self.editor()).collect()
    }

    fn ensure_root(state: &mut PageState) {
        if state.root.is_none() {
            state.root = Some(MemoryElement::new(ElementKind::Root));
        }
        state.closed = false;
    }

    fn clear_surfaces(state: &mut PageState) {
        for element in state.rich.take().into_iter().chain(state.plain.take()) {
            element.detach();
        }
    }

    fn mutate(&self, change: impl FnOnce(&mut PageState)) {
        change(&mut self.state.borrow_mut());
        self.fire_observers();
    }

    fn fire_observers(&self) {
        let callbacks: Vec<_> = self
            .state
            .borrow()
            .observers
            .iter()
            .map(|observer| observer.callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    fn register(&self, add: impl FnOnce(&mut PageState, u64)) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        add(&mut state, id);
        id
    }

    fn release(&self, remove: impl FnOnce(&mut PageState) + 'static) -> Subscription {
        let state: Weak<RefCell<PageState>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                remove(&mut state.borrow_mut());
            }
        })
    }

    fn observe_any(&self, callback: Rc<dyn Fn()>) -> Subscription {
        let id = self.register(|state, id| state.observers.push(Observer { id, callback }));
        self.release(move |state| state.observers.retain(|observer| observer.id != id))
    }
}

impl Notifier for MemoryPage {
    fn alert(&self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_owned());
    }
}

impl HostPage for MemoryPage {
    type Element = MemoryElement;

    fn composition_root(&self) -> Option<MemoryElement> {
        self.root()
    }

    fn is_closed(&self, _root: &MemoryElement) -> bool {
        self.state.borrow().closed
    }

    fn rich_surface(&self, _root: &MemoryElement) -> Option<MemoryElement> {
        self.state.borrow().rich.clone()
    }

    fn plain_surface(&self, _root: &MemoryElement) -> Option<MemoryElement> {
        self.state.borrow().plain.clone()
    }

    fn toolbar(&self, _root: &MemoryElement) -> Option<MemoryElement> {
        self.state.borrow().toolbar.clone()
    }

    fn upload_trigger(&self, _root: &MemoryElement) -> Option<MemoryElement> {
        self.state.borrow().trigger.clone()
    }

    fn rich_adapter(&self, editor: &MemoryElement) -> Option<Rc<dyn EditorAdapter>> {
        let doc = editor.rich()?.clone();
        Some(Rc::new(RichDocumentAdapter::new(doc)))
    }

    fn plain_adapter(&self, editor: &MemoryElement) -> Option<Rc<dyn EditorAdapter>> {
        let textarea = editor.textarea()?.clone();
        Some(Rc::new(PlainTextAdapter::new(textarea)))
    }

    fn listen(
        &self,
        target: &MemoryElement,
        kind: EventKind,
        handler: EventHandler,
    ) -> Subscription {
        let target = target.clone();
        let id = self.register(|state, id| {
            state.listeners.push(Listener {
                id,
                target,
                kind,
                handler,
            })
        });
        self.release(move |state| state.listeners.retain(|listener| listener.id != id))
    }

    fn observe(&self, _target: &MemoryElement, callback: Rc<dyn Fn()>) -> Subscription {
        self.observe_any(callback)
    }

    fn observe_page(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.observe_any(callback)
    }

    fn on_lifecycle(&self, callback: Rc<dyn Fn(Lifecycle)>) -> Subscription {
        let id = self.register(|state, id| state.lifecycle.push((id, callback)));
        self.release(move |state| state.lifecycle.retain(|(entry, _)| *entry != id))
    }

    fn pick_files(&self, accept: &str, on_pick: FilesCallback) -> Subscription {
        let accept = accept.to_owned();
        let id = self.register(|state, id| {
            state.pickers.push(Picker {
                id,
                accept,
                on_pick: Some(on_pick),
            })
        });
        self.release(move |state| state.pickers.retain(|picker| picker.id != id))
    }

    fn reveal(&self, element: &MemoryElement) {
        element.data.visible.set(true);
    }
}
