//! Binding manager: keeps the engine attached to the live composition surface.
//!
//! The host may create, destroy or swap the surface at any time, and it
//! reports structural changes redundantly. Every signal funnels into
//! [`BindingManager::refresh`], which is idempotent: a candidate whose editor
//! element is the one already bound is a no-op, so listeners are never
//! registered twice.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::adapter::EditorAdapter;
use crate::classify::accept_string;
use crate::engine::UploadEngine;
use crate::file::FileHandle;
use crate::host::{EventKind, HostEvent, HostPage, Lifecycle, Subscription};

/// A discovered, live composition surface.
pub struct EditorContext<E> {
    pub root: E,
    pub editor: E,
    pub toolbar: Option<E>,
    pub upload_trigger: Option<E>,
    pub adapter: Rc<dyn EditorAdapter>,
}

struct Bound<E> {
    context: EditorContext<E>,
    subscriptions: Vec<Subscription>,
    /// Most recently opened file picker.
    picker: Option<Subscription>,
}

enum Binding<E> {
    Unbound,
    Bound(Bound<E>),
}

/// Discovers the composition surface and owns every subscription made for it.
pub struct BindingManager<H: HostPage> {
    host: Rc<H>,
    engine: Rc<UploadEngine>,
    state: RefCell<Binding<H::Element>>,
    /// Page-wide observers and lifecycle hooks, alive between start and stop.
    watchers: RefCell<Vec<Subscription>>,
    this: Weak<Self>,
}

impl<H: HostPage + 'static> BindingManager<H> {
    pub fn new(host: Rc<H>, engine: Rc<UploadEngine>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            host,
            engine,
            state: RefCell::new(Binding::Unbound),
            watchers: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn engine(&self) -> &Rc<UploadEngine> {
        &self.engine
    }

    /// Watch the page and the host lifecycle, then bind if a surface exists.
    pub fn start(&self) {
        self.stop();

        let this = self.this.clone();
        let on_change: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(manager) = this.upgrade() {
                manager.refresh();
            }
        });

        let this = self.this.clone();
        let on_lifecycle: Rc<dyn Fn(Lifecycle)> = Rc::new(move |signal| {
            let Some(manager) = this.upgrade() else {
                return;
            };
            tracing::debug!(?signal, "composer lifecycle");
            match signal {
                Lifecycle::Opened | Lifecycle::Recovered => manager.refresh(),
                Lifecycle::Closed | Lifecycle::Destroyed => manager.unbind(),
            }
        });

        let watchers = vec![
            self.host.observe_page(on_change),
            self.host.on_lifecycle(on_lifecycle),
        ];
        *self.watchers.borrow_mut() = watchers;

        self.refresh();
    }

    /// Release every subscription. In-flight uploads still resolve.
    pub fn stop(&self) {
        let watchers = std::mem::take(&mut *self.watchers.borrow_mut());
        drop(watchers);
        self.unbind();
    }

    pub fn is_bound(&self) -> bool {
        matches!(*self.state.borrow(), Binding::Bound(_))
    }

    /// Editor element of the current binding.
    pub fn bound_editor(&self) -> Option<H::Element> {
        match &*self.state.borrow() {
            Binding::Bound(bound) => Some(bound.context.editor.clone()),
            Binding::Unbound => None,
        }
    }

    /// Re-evaluate which surface is live and rebind if it changed.
    pub fn refresh(&self) {
        let Some(candidate) = self.locate() else {
            self.unbind();
            return;
        };

        if self.bound_editor().as_ref() == Some(&candidate.editor) {
            tracing::trace!("surface unchanged");
            return;
        }

        self.unbind();
        tracing::debug!(
            surface = %candidate.adapter.kind(),
            toolbar = candidate.toolbar.is_some(),
            trigger = candidate.upload_trigger.is_some(),
            "composer ready"
        );

        let subscriptions = self.subscribe(&candidate);
        self.engine.set_current(Some(candidate.adapter.clone()));
        *self.state.borrow_mut() = Binding::Bound(Bound {
            context: candidate,
            subscriptions,
            picker: None,
        });
    }

    /// Tear down the current binding, releasing all of its subscriptions.
    pub fn unbind(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), Binding::Unbound);
        if let Binding::Bound(bound) = previous {
            tracing::debug!(
                subscriptions = bound.subscriptions.len(),
                "composer binding released"
            );
            self.engine.set_current(None);
            drop(bound);
        }
    }

    fn locate(&self) -> Option<EditorContext<H::Element>> {
        let host = &self.host;
        let root = host.composition_root()?;
        if host.is_closed(&root) {
            return None;
        }

        // Rich takes priority when the host renders both.
        let (editor, adapter) = match host.rich_surface(&root) {
            Some(editor) => {
                let adapter = host.rich_adapter(&editor)?;
                (editor, adapter)
            }
            None => {
                let editor = host.plain_surface(&root)?;
                let adapter = host.plain_adapter(&editor)?;
                (editor, adapter)
            }
        };

        Some(EditorContext {
            toolbar: host.toolbar(&root),
            upload_trigger: host.upload_trigger(&root),
            root,
            editor,
            adapter,
        })
    }

    fn subscribe(&self, context: &EditorContext<H::Element>) -> Vec<Subscription> {
        let host = &self.host;
        let adapter = &context.adapter;
        let mut subscriptions = Vec::new();

        let on_paste = self.file_handler(adapter.clone(), false);
        let on_drop = self.file_handler(adapter.clone(), true);
        let on_drag_over: Rc<dyn Fn(&dyn HostEvent)> = Rc::new(|event: &dyn HostEvent| {
            if event.has_files() {
                event.prevent_default();
            }
        });

        subscriptions.push(host.listen(&context.editor, EventKind::Paste, on_paste));
        subscriptions.push(host.listen(&context.editor, EventKind::Drop, on_drop.clone()));
        subscriptions.push(host.listen(
            &context.editor,
            EventKind::DragOver,
            on_drag_over.clone(),
        ));

        if context.root != context.editor {
            subscriptions.push(host.listen(&context.root, EventKind::Drop, on_drop));
            subscriptions.push(host.listen(&context.root, EventKind::DragOver, on_drag_over));
        }

        if let Some(trigger) = &context.upload_trigger {
            let this = self.this.clone();
            let adapter = adapter.clone();
            let on_click: Rc<dyn Fn(&dyn HostEvent)> = Rc::new(move |event: &dyn HostEvent| {
                event.prevent_default();
                event.stop_propagation();
                if let Some(manager) = this.upgrade() {
                    manager.open_picker(adapter.clone());
                }
            });
            subscriptions.push(host.listen(trigger, EventKind::Click, on_click));
            host.reveal(trigger);
        }

        // Catch variant swaps inside an already-bound root.
        let this = self.this.clone();
        subscriptions.push(host.observe(
            &context.root,
            Rc::new(move || {
                if let Some(manager) = this.upgrade() {
                    manager.refresh();
                }
            }),
        ));

        subscriptions
    }

    /// Paste and drop share one handler; drops are claimed on `has_files`,
    /// pastes only when the clipboard actually yields files.
    fn file_handler(
        &self,
        adapter: Rc<dyn EditorAdapter>,
        is_drop: bool,
    ) -> Rc<dyn Fn(&dyn HostEvent)> {
        let engine = self.engine.clone();
        Rc::new(move |event: &dyn HostEvent| {
            if is_drop && !event.has_files() {
                return;
            }
            let files = event.files();
            if !is_drop && files.is_empty() {
                return;
            }
            event.prevent_default();
            event.stop_propagation();
            engine.process_files(files, adapter.clone());
        })
    }

    fn open_picker(&self, adapter: Rc<dyn EditorAdapter>) {
        let engine = self.engine.clone();
        let picker = self.host.pick_files(
            &accept_string(),
            Box::new(move |files: Vec<Rc<dyn FileHandle>>| {
                engine.process_files(files, adapter);
            }),
        );

        // A new picker replaces the last one; both die with the binding.
        let released = match &mut *self.state.borrow_mut() {
            Binding::Bound(bound) => bound.picker.replace(picker),
            Binding::Unbound => Some(picker),
        };
        drop(released);
    }
}
