//! Plain-text adapter over a value + selection surface.

use std::ops::Range;

use super::{EditorAdapter, SurfaceKind, append_suffix};
use crate::text::{find_chars, len_chars, splice};

/// A plain editable text buffer (a `<textarea>` in the browser).
///
/// Selection offsets are char offsets.
pub trait TextareaSurface {
    fn is_connected(&self) -> bool;

    fn focus(&self);

    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    fn selection(&self) -> Range<usize>;

    fn set_selection(&self, selection: Range<usize>);

    /// Vertical scroll position. Surfaces without scrolling return 0.
    fn scroll_top(&self) -> i32 {
        0
    }

    fn set_scroll_top(&self, _scroll_top: i32) {}

    /// Emit the surface's standard "content changed" notification.
    fn notify_changed(&self);
}

/// [`EditorAdapter`] for plain text surfaces.
pub struct PlainTextAdapter<S> {
    surface: S,
}

impl<S: TextareaSurface> PlainTextAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn set_caret(&self, offset: usize) {
        self.surface.set_selection(offset..offset);
    }
}

impl<S: TextareaSurface> EditorAdapter for PlainTextAdapter<S> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::PlainText
    }

    fn is_usable(&self) -> bool {
        self.surface.is_connected()
    }

    fn focus(&self) {
        self.surface.focus();
    }

    fn insert_placeholder(&self, text: &str) {
        let value = self.surface.value();
        let selection = self.surface.selection();
        let scroll_top = self.surface.scroll_top();

        // Hosts may report a selection past the end after external edits.
        let end = selection.end.min(len_chars(&value));
        let start = selection.start.min(end);

        self.surface.set_value(&splice(&value, start, end, text));
        self.set_caret(start + len_chars(text));
        self.surface.set_scroll_top(scroll_top);
        self.surface.notify_changed();
    }

    fn replace_placeholder(&self, placeholder: &str, replacement: &str) -> bool {
        let value = self.surface.value();
        let Some(start) = find_chars(&value, placeholder) else {
            return false;
        };

        let end = start + len_chars(placeholder);
        self.surface.set_value(&splice(&value, start, end, replacement));
        self.set_caret(start + len_chars(replacement));
        self.surface.notify_changed();
        true
    }

    fn append_content(&self, text: &str) {
        let mut value = self.surface.value();
        value.push_str(&append_suffix(&value, text));

        self.surface.set_value(&value);
        self.set_caret(len_chars(&value));
        self.surface.notify_changed();
    }
}
