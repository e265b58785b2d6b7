//! File categories and the text rendered for them.
//!
//! Everything here is a pure function of its inputs: category detection from
//! the declared content type, placeholder and failure markers, and the final
//! markup that replaces a placeholder.

use crate::config::Locale;
use crate::error::ErrorKind;
use crate::session::SessionId;

/// Semantic category of an accepted file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Image,
    Video,
    Audio,
    Document,
}

impl Category {
    /// Detection order. The first match wins.
    pub const ALL: [Category; 4] = [
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Document,
    ];

    fn matches(self, content_type: &str) -> bool {
        match self {
            Category::Image => content_type.starts_with("image/"),
            Category::Video => content_type.starts_with("video/"),
            Category::Audio => content_type.starts_with("audio/"),
            Category::Document => content_type == "application/pdf",
        }
    }

    /// File-picker accept token for this category.
    pub fn accept(self) -> &'static str {
        match self {
            Category::Image => "image/*",
            Category::Video => "video/*",
            Category::Audio => "audio/*",
            Category::Document => ".pdf",
        }
    }

    /// Embeds get a leading `!`, attachments don't.
    fn is_embed(self) -> bool {
        !matches!(self, Category::Document)
    }

    /// Type hint carried inside the brackets.
    fn hint(self) -> &'static str {
        match self {
            Category::Image => "",
            Category::Video => "|video",
            Category::Audio => "|audio",
            Category::Document => "|attachment",
        }
    }
}

/// Classify a declared content type.
pub fn classify(content_type: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| category.matches(content_type))
}

/// Comma-separated accept filter covering every category.
pub fn accept_string() -> String {
    Category::ALL
        .iter()
        .map(|c| c.accept())
        .collect::<Vec<_>>()
        .join(",")
}

fn uploading_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "uploading...",
        Locale::Zh => "上传中...",
    }
}

fn failed_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "upload-failed",
        Locale::Zh => "上传失败",
    }
}

/// In-progress marker for a session. Embeds the session id so the exact
/// text can be found again later.
pub fn placeholder_label(category: Option<Category>, id: &SessionId, locale: Locale) -> String {
    let prefix = if category.is_some_and(Category::is_embed) {
        "!"
    } else {
        ""
    };
    let suffix = category.map(Category::hint).unwrap_or("");
    format!("{prefix}[{}{id}{suffix}]", uploading_label(locale))
}

/// Failure marker that replaces a placeholder when a transfer fails.
pub fn failure_label(id: &SessionId, kind: ErrorKind, locale: Locale) -> String {
    format!("[{}({})-{id}]", failed_label(locale), kind.label(locale))
}

/// Final markup for an uploaded file.
pub fn markup_for(filename: &str, category: Option<Category>, url: &str) -> String {
    match category {
        Some(category) => {
            let bang = if category.is_embed() { "!" } else { "" };
            format!("{bang}[{filename}{}]({url})", category.hint())
        }
        None => format!("[{filename}]({url})"),
    }
}

/// Surround content with blank lines so it sits in its own block.
pub fn pad_block(content: &str) -> String {
    format!("\n{content}\n\n")
}
