//! Editor adapters: the only code that touches a composition surface.
//!
//! The engine talks to every surface through [`EditorAdapter`]. Two variants
//! implement it over platform traits, so the same adapter logic drives both a
//! real browser DOM and the in-memory host:
//!
//! - [`PlainTextAdapter`] over a [`TextareaSurface`] (value + selection)
//! - [`RichDocumentAdapter`] over a [`RichSurface`] (tree of text nodes)
//!
//! All offsets crossing these traits are char offsets.

mod plain;
mod rich;

pub use plain::{PlainTextAdapter, TextareaSurface};
pub use rich::{RichDocumentAdapter, RichSurface};

/// Which surface variant an adapter drives. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    PlainText,
    RichDocument,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::PlainText => f.write_str("plain-text"),
            SurfaceKind::RichDocument => f.write_str("rich-document"),
        }
    }
}

/// Uniform capability set over a composition surface.
///
/// Methods take `&self`: surfaces are shared handles into a host tree that the
/// host mutates too.
pub trait EditorAdapter {
    fn kind(&self) -> SurfaceKind;

    /// Whether the surface is still attached to the live tree.
    fn is_usable(&self) -> bool;

    fn focus(&self);

    /// Insert literal text at the caret, replacing any selection. The caret
    /// ends up right after the inserted text.
    fn insert_placeholder(&self, text: &str);

    /// Replace the first exact occurrence of `placeholder` with
    /// `replacement`. Returns `false` when there is no occurrence.
    fn replace_placeholder(&self, placeholder: &str, replacement: &str) -> bool;

    /// Append `text` as its own block at the end of the content.
    fn append_content(&self, text: &str);
}

/// Text to append after `current` so `content` lands on its own block.
pub(crate) fn append_suffix(current: &str, content: &str) -> String {
    let mut out = String::new();
    if !current.is_empty() && !current.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&crate::classify::pad_block(content));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_suffix() {
        assert_eq!(append_suffix("", "x"), "\nx\n\n");
        assert_eq!(append_suffix("line\n", "x"), "\nx\n\n");
        assert_eq!(append_suffix("line", "x"), "\n\nx\n\n");
    }
}
