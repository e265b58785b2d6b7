//! Rich-document adapter over a tree of text nodes.
//!
//! Content in a structured editor is spread over many nodes, so lookups walk
//! the text-bearing nodes in document order and match inside a single node.
//! Insertion prefers the surface's native text insertion (which keeps the
//! editor's own model in sync), then manual selection-range edits, and only
//! appends a bare text node when nothing else is available.

use std::ops::Range;

use super::{EditorAdapter, SurfaceKind, append_suffix};
use crate::text::{find_chars, len_chars};

/// A structured, contenteditable-style document.
///
/// Node handles are opaque to the adapter; offsets within a node are chars.
pub trait RichSurface {
    type Node;

    fn is_connected(&self) -> bool;

    fn focus(&self);

    /// Text-bearing nodes in document order.
    fn text_nodes(&self) -> Vec<Self::Node>;

    fn node_text(&self, node: &Self::Node) -> String;

    /// Delete `range` within `node` and insert `text` as a new text node in
    /// its place. Returns the inserted node, or `None` if the edit failed.
    fn replace_in_node(
        &self,
        node: &Self::Node,
        range: Range<usize>,
        text: &str,
    ) -> Option<Self::Node>;

    /// Collapse the selection right after `node`'s text.
    fn place_caret_after(&self, node: &Self::Node);

    /// Insert through the native editing command. `false` if unsupported.
    fn native_insert_text(&self, text: &str) -> bool;

    /// Replace the current selection range with `text`. `false` if there is
    /// no selection range.
    fn insert_at_selection(&self, text: &str) -> bool;

    /// Append a text node at the end of the surface.
    fn append_text(&self, text: &str);

    fn move_caret_to_end(&self);

    fn notify_changed(&self);
}

/// [`EditorAdapter`] for rich document surfaces.
pub struct RichDocumentAdapter<S> {
    surface: S,
}

impl<S: RichSurface> RichDocumentAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Full text content, concatenated across nodes.
    pub fn text_content(&self) -> String {
        self.surface
            .text_nodes()
            .iter()
            .map(|node| self.surface.node_text(node))
            .collect()
    }

    fn insert_text(&self, text: &str) {
        if !self.surface.native_insert_text(text) && !self.surface.insert_at_selection(text) {
            self.surface.append_text(text);
        }
        self.surface.notify_changed();
    }

    fn find_placeholder(&self, placeholder: &str) -> Option<(S::Node, Range<usize>)> {
        self.surface.text_nodes().into_iter().find_map(|node| {
            let start = find_chars(&self.surface.node_text(&node), placeholder)?;
            Some((node, start..start + len_chars(placeholder)))
        })
    }
}

impl<S: RichSurface> EditorAdapter for RichDocumentAdapter<S> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::RichDocument
    }

    fn is_usable(&self) -> bool {
        self.surface.is_connected()
    }

    fn focus(&self) {
        self.surface.focus();
    }

    fn insert_placeholder(&self, text: &str) {
        self.surface.focus();
        self.insert_text(text);
    }

    fn replace_placeholder(&self, placeholder: &str, replacement: &str) -> bool {
        let Some((node, range)) = self.find_placeholder(placeholder) else {
            return false;
        };

        let Some(inserted) = self.surface.replace_in_node(&node, range, replacement) else {
            return false;
        };
        self.surface.place_caret_after(&inserted);
        self.surface.notify_changed();
        true
    }

    fn append_content(&self, text: &str) {
        let suffix = append_suffix(&self.text_content(), text);
        self.surface.focus();
        self.surface.move_caret_to_end();
        self.insert_text(&suffix);
    }
}
