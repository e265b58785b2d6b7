//! The forum page as a [`HostPage`].

use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use tack_core::{
    EditorAdapter, EventHandler, EventKind, FilesCallback, FileHandle, HostPage, Lifecycle,
    Notifier, PlainTextAdapter, RichDocumentAdapter, Subscription,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Window};

use crate::event::DomEvent;
use crate::file::DomFile;
use crate::surface::{DomRichSurface, DomTextarea};

/// Where the host renders each part of the composer.
pub mod selectors {
    pub const ROOT: &str = "#reply-control";
    pub const TOOLBAR: &str = ".d-editor-button-bar";
    pub const UPLOAD_TRIGGER: &str = ".toolbar__button.upload";
    pub const PLAIN: &str = "textarea.d-editor-input";
    pub const RICH: &str = ".ProseMirror-container .ProseMirror.d-editor-input";
    /// Class on the root while the composer is collapsed.
    pub const CLOSED: &str = "closed";
}

/// Document events the host fires around the composer's lifecycle.
const LIFECYCLE_EVENTS: [(&str, Lifecycle); 4] = [
    ("tack:composer-opened", Lifecycle::Opened),
    ("tack:composer-recovered", Lifecycle::Recovered),
    ("tack:composer-closed", Lifecycle::Closed),
    ("tack:composer-destroyed", Lifecycle::Destroyed),
];

/// Body attribute announcing that the uploader is active.
const MARKER: &str = "data-tack-uploader";

pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mark the page so host scripts can tell the uploader is running.
    pub fn set_marker(&self, active: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let result = if active {
            body.set_attribute(MARKER, "plugin")
        } else {
            body.remove_attribute(MARKER)
        };
        if let Err(e) = result {
            tracing::warn!("failed to update page marker: {:?}", e);
        }
    }

    fn find(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn mutation_observer(
        &self,
        target: &web_sys::Node,
        callback: Rc<dyn Fn()>,
    ) -> Result<Subscription, JsValue> {
        let closure = Closure::<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: web_sys::MutationObserver| callback(),
        );
        let observer = web_sys::MutationObserver::new(closure.as_ref().unchecked_ref())?;

        let options = web_sys::MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_attributes(true);
        options.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str("class")));
        observer.observe_with_options(target, &options)?;

        Ok(Subscription::new(move || {
            observer.disconnect();
            drop(closure);
        }))
    }

    fn observe_node(&self, target: &web_sys::Node, callback: Rc<dyn Fn()>) -> Subscription {
        self.mutation_observer(target, callback).unwrap_or_else(|e| {
            tracing::warn!("failed to observe page: {:?}", e);
            Subscription::noop()
        })
    }

    fn file_input(&self, accept: &str) -> Result<HtmlInputElement, JsValue> {
        let input: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
        input.set_type("file");
        input.set_multiple(true);
        input.set_accept(accept);
        input.style().set_property("display", "none")?;
        if let Some(body) = self.document.body() {
            body.append_child(&input)?;
        }
        Ok(input)
    }
}

impl Notifier for DomHost {
    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            tracing::warn!("alert failed: {:?}", e);
        }
    }
}

impl HostPage for DomHost {
    type Element = Element;

    fn composition_root(&self) -> Option<Element> {
        self.document.query_selector(selectors::ROOT).ok().flatten()
    }

    fn is_closed(&self, root: &Element) -> bool {
        root.class_list().contains(selectors::CLOSED)
    }

    fn rich_surface(&self, root: &Element) -> Option<Element> {
        self.find(root, selectors::RICH)
    }

    fn plain_surface(&self, root: &Element) -> Option<Element> {
        self.find(root, selectors::PLAIN)
    }

    fn toolbar(&self, root: &Element) -> Option<Element> {
        self.find(root, selectors::TOOLBAR)
    }

    fn upload_trigger(&self, root: &Element) -> Option<Element> {
        self.find(root, selectors::UPLOAD_TRIGGER)
    }

    fn rich_adapter(&self, editor: &Element) -> Option<Rc<dyn EditorAdapter>> {
        let element = editor.dyn_ref::<HtmlElement>()?.clone();
        let surface = DomRichSurface::new(element, self.document.clone());
        Some(Rc::new(RichDocumentAdapter::new(surface)))
    }

    fn plain_adapter(&self, editor: &Element) -> Option<Rc<dyn EditorAdapter>> {
        let element = editor.dyn_ref::<HtmlTextAreaElement>()?.clone();
        Some(Rc::new(PlainTextAdapter::new(DomTextarea::new(element))))
    }

    fn listen(&self, target: &Element, kind: EventKind, handler: EventHandler) -> Subscription {
        let options = EventListenerOptions {
            phase: EventListenerPhase::Capture,
            passive: false,
        };
        let listener =
            EventListener::new_with_options(target, kind.as_str(), options, move |event| {
                handler(&DomEvent::new(event.clone()));
            });
        Subscription::guard(listener)
    }

    fn observe(&self, target: &Element, callback: Rc<dyn Fn()>) -> Subscription {
        self.observe_node(target, callback)
    }

    fn observe_page(&self, callback: Rc<dyn Fn()>) -> Subscription {
        match self.document.body() {
            Some(body) => self.observe_node(&body, callback),
            None => self.observe_node(&self.document, callback),
        }
    }

    fn on_lifecycle(&self, callback: Rc<dyn Fn(Lifecycle)>) -> Subscription {
        let listeners: Vec<EventListener> = LIFECYCLE_EVENTS
            .iter()
            .map(|&(name, signal)| {
                let callback = callback.clone();
                EventListener::new(&self.document, name, move |_event| callback(signal))
            })
            .collect();
        Subscription::guard(listeners)
    }

    fn pick_files(&self, accept: &str, on_pick: FilesCallback) -> Subscription {
        let input = match self.file_input(accept) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("failed to create file picker: {:?}", e);
                return Subscription::noop();
            }
        };

        let picked = input.clone();
        let listener = EventListener::once(&input, "change", move |_event| {
            let files: Vec<Rc<dyn FileHandle>> = picked
                .files()
                .map(|list| {
                    (0..list.length())
                        .filter_map(|i| list.item(i))
                        .map(|file| Rc::new(DomFile::new(file)) as Rc<dyn FileHandle>)
                        .collect()
                })
                .unwrap_or_default();
            picked.remove();
            if !files.is_empty() {
                on_pick(files);
            }
        });
        input.click();

        Subscription::new(move || {
            drop(listener);
            input.remove();
        })
    }

    fn reveal(&self, element: &Element) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(e) = element.style().set_property("display", "inline-flex") {
            tracing::warn!("failed to reveal upload trigger: {:?}", e);
        }
    }
}
