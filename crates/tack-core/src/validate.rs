//! Pre-upload validation.

use crate::classify::{Category, classify};
use crate::config::Locale;
use crate::error::ErrorKind;
use crate::file::FileHandle;

/// Why a file was turned away before any placeholder was inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    FileType,
    FileSize,
}

impl Rejection {
    pub fn kind(self) -> ErrorKind {
        match self {
            Rejection::FileType => ErrorKind::FileType,
            Rejection::FileSize => ErrorKind::FileSize,
        }
    }
}

/// Accept or reject `file`.
///
/// The content type is checked before the size, so an oversized file of an
/// unknown type is reported as a type problem.
pub fn validate(file: &dyn FileHandle, max_bytes: u64) -> Result<Category, Rejection> {
    let category = classify(file.content_type()).ok_or(Rejection::FileType)?;
    if file.size() > max_bytes {
        return Err(Rejection::FileSize);
    }
    Ok(category)
}

/// Alert text for a rejected file.
pub fn rejection_message(
    file: &dyn FileHandle,
    rejection: Rejection,
    max_mb: f64,
    locale: Locale,
) -> String {
    let content_type = file.content_type();
    match (rejection, locale) {
        (Rejection::FileType, Locale::En) => format!(
            "Unsupported file type: {}",
            if content_type.is_empty() { "unknown" } else { content_type }
        ),
        (Rejection::FileType, Locale::Zh) => format!(
            "不支持的文件类型: {}",
            if content_type.is_empty() { "未知" } else { content_type }
        ),
        (Rejection::FileSize, Locale::En) => format!(
            "File \"{}\" exceeds the {max_mb}MB size limit and cannot be uploaded.",
            file.name()
        ),
        (Rejection::FileSize, Locale::Zh) => {
            format!("文件\"{}\"超过{max_mb}MB大小限制，无法上传。", file.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFile;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_accepts_known_type_within_limit() {
        let file = MemoryFile::sized("a.png", "image/png", MB);
        assert_eq!(validate(&file, MB), Ok(Category::Image));
    }

    #[test]
    fn test_rejects_oversized() {
        let file = MemoryFile::sized("a.pdf", "application/pdf", MB + 1);
        assert_eq!(validate(&file, MB), Err(Rejection::FileSize));
    }

    #[test]
    fn test_type_checked_before_size() {
        let file = MemoryFile::sized("a.zip", "application/zip", 10 * MB);
        assert_eq!(validate(&file, MB), Err(Rejection::FileType));

        let file = MemoryFile::sized("a.zip", "application/zip", 1);
        assert_eq!(validate(&file, MB), Err(Rejection::FileType));
    }

    #[test]
    fn test_rejection_messages() {
        let file = MemoryFile::sized("big.mp4", "video/mp4", 30 * MB);
        assert_eq!(
            rejection_message(&file, Rejection::FileSize, 20.0, Locale::En),
            "File \"big.mp4\" exceeds the 20MB size limit and cannot be uploaded."
        );

        let file = MemoryFile::sized("x", "", 1);
        assert_eq!(
            rejection_message(&file, Rejection::FileType, 20.0, Locale::Zh),
            "不支持的文件类型: 未知"
        );
    }
}
