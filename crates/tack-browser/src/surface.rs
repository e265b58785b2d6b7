//! DOM implementations of the composition surfaces.
//!
//! The DOM counts offsets in UTF-16 code units; the surface traits count
//! chars. Conversion happens here and nowhere else.

use std::ops::Range;

use tack_core::text::{char_to_utf16, len_chars, utf16_to_char};
use tack_core::{RichSurface, TextareaSurface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, EventInit, HtmlDocument, HtmlElement, HtmlTextAreaElement, Node};

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// Dispatch a bubbling `input` event so the host editor picks up the change.
fn dispatch_input(target: &web_sys::EventTarget) {
    let init = EventInit::new();
    init.set_bubbles(true);
    let result = Event::new_with_event_init_dict("input", &init)
        .and_then(|event| target.dispatch_event(&event));
    if let Err(e) = result {
        tracing::warn!("failed to dispatch input event: {:?}", e);
    }
}

/// A `<textarea>` composer.
#[derive(Clone)]
pub struct DomTextarea {
    element: HtmlTextAreaElement,
}

impl DomTextarea {
    pub fn new(element: HtmlTextAreaElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlTextAreaElement {
        &self.element
    }
}

impl TextareaSurface for DomTextarea {
    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn focus(&self) {
        let _ = self.element.focus();
    }

    fn value(&self) -> String {
        self.element.value()
    }

    fn set_value(&self, value: &str) {
        self.element.set_value(value);
    }

    fn selection(&self) -> Range<usize> {
        let value = self.element.value();
        let to_char = |offset: Result<Option<u32>, JsValue>| {
            offset
                .ok()
                .flatten()
                .map(|utf16| utf16_to_char(&value, utf16 as usize))
        };
        let end = to_char(self.element.selection_end()).unwrap_or_else(|| len_chars(&value));
        let start = to_char(self.element.selection_start()).unwrap_or(end);
        start..end
    }

    fn set_selection(&self, selection: Range<usize>) {
        let value = self.element.value();
        let start = char_to_utf16(&value, selection.start) as u32;
        let end = char_to_utf16(&value, selection.end) as u32;
        if let Err(e) = self.element.set_selection_range(start, end) {
            tracing::warn!("failed to set textarea selection: {:?}", e);
        }
    }

    fn scroll_top(&self) -> i32 {
        self.element.scroll_top()
    }

    fn set_scroll_top(&self, scroll_top: i32) {
        self.element.set_scroll_top(scroll_top);
    }

    fn notify_changed(&self) {
        dispatch_input(&self.element);
    }
}

/// A contenteditable rich editor.
#[derive(Clone)]
pub struct DomRichSurface {
    element: HtmlElement,
    document: Document,
}

impl DomRichSurface {
    pub fn new(element: HtmlElement, document: Document) -> Self {
        Self { element, document }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn selection(&self) -> Option<web_sys::Selection> {
        self.document.get_selection().ok().flatten()
    }

    /// Whether the selection is anchored inside this editor.
    fn owns_selection(&self) -> bool {
        self.selection()
            .and_then(|selection| selection.anchor_node())
            .is_some_and(|anchor| self.element.contains(Some(&anchor)))
    }

    fn select(&self, range: &web_sys::Range) -> Result<(), JsValue> {
        if let Some(selection) = self.selection() {
            selection.remove_all_ranges()?;
            selection.add_range(range)?;
        }
        Ok(())
    }

    fn try_replace(&self, node: &Node, range: Range<usize>, text: &str) -> Result<Node, JsValue> {
        let content = node.text_content().unwrap_or_default();
        let dom_range = self.document.create_range()?;
        dom_range.set_start(node, char_to_utf16(&content, range.start) as u32)?;
        dom_range.set_end(node, char_to_utf16(&content, range.end) as u32)?;
        dom_range.delete_contents()?;

        let inserted: Node = self.document.create_text_node(text).into();
        dom_range.insert_node(&inserted)?;
        Ok(inserted)
    }

    fn try_place_caret_after(&self, node: &Node) -> Result<(), JsValue> {
        let range = self.document.create_range()?;
        range.set_start_after(node)?;
        range.collapse_with_to_start(true);
        self.select(&range)
    }

    fn try_insert_at_selection(&self, text: &str) -> Result<bool, JsValue> {
        let Some(selection) = self.selection() else {
            return Ok(false);
        };
        if selection.range_count() == 0 || !self.owns_selection() {
            return Ok(false);
        }

        let range = selection.get_range_at(0)?;
        range.delete_contents()?;
        let node: Node = self.document.create_text_node(text).into();
        range.insert_node(&node)?;
        self.try_place_caret_after(&node)?;
        Ok(true)
    }

    fn try_move_caret_to_end(&self) -> Result<(), JsValue> {
        let range = self.document.create_range()?;
        range.select_node_contents(&self.element)?;
        range.collapse_with_to_start(false);
        self.select(&range)
    }
}

impl RichSurface for DomRichSurface {
    type Node = Node;

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn focus(&self) {
        let _ = self.element.focus();
    }

    fn text_nodes(&self) -> Vec<Node> {
        let walker = match self
            .document
            .create_tree_walker_with_what_to_show(&self.element, SHOW_TEXT)
        {
            Ok(walker) => walker,
            Err(e) => {
                tracing::warn!("failed to walk editor text: {:?}", e);
                return Vec::new();
            }
        };

        let mut nodes = Vec::new();
        while let Ok(Some(node)) = walker.next_node() {
            nodes.push(node);
        }
        nodes
    }

    fn node_text(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn replace_in_node(&self, node: &Node, range: Range<usize>, text: &str) -> Option<Node> {
        self.try_replace(node, range, text)
            .inspect_err(|e| tracing::warn!("failed to replace editor text: {:?}", e))
            .ok()
    }

    fn place_caret_after(&self, node: &Node) {
        if let Err(e) = self.try_place_caret_after(node) {
            tracing::warn!("failed to place caret: {:?}", e);
        }
    }

    fn native_insert_text(&self, text: &str) -> bool {
        let Some(document) = self.document.dyn_ref::<HtmlDocument>() else {
            return false;
        };
        let supported = document.query_command_supported("insertText");
        if !supported || !self.owns_selection() {
            return false;
        }
        document
            .exec_command_with_show_ui_and_value("insertText", false, text)
            .unwrap_or(false)
    }

    fn insert_at_selection(&self, text: &str) -> bool {
        self.try_insert_at_selection(text).unwrap_or_else(|e| {
            tracing::warn!("failed to insert at selection: {:?}", e);
            false
        })
    }

    fn append_text(&self, text: &str) {
        let node = self.document.create_text_node(text);
        if let Err(e) = self.element.append_child(&node) {
            tracing::warn!("failed to append editor text: {:?}", e);
        }
    }

    fn move_caret_to_end(&self) {
        if let Err(e) = self.try_move_caret_to_end() {
            tracing::warn!("failed to move caret: {:?}", e);
        }
    }

    fn notify_changed(&self) {
        dispatch_input(&self.element);
    }
}
