//! Offset conversions between the units surfaces and Rust strings use.
//!
//! Adapters work in Unicode scalar offsets (chars). Rust slicing needs byte
//! offsets and browser selection APIs report UTF-16 code units.

/// Byte index of the char at `char_offset`, clamped to the end of `s`.
pub fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Char offset of `byte_offset`. `byte_offset` must be a char boundary.
pub fn byte_to_char(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset.min(s.len())].chars().count()
}

/// Length of `s` in chars.
pub fn len_chars(s: &str) -> usize {
    s.chars().count()
}

/// Convert a UTF-16 code unit offset into a char offset.
///
/// An offset that lands inside a surrogate pair is rounded up to the end of
/// that char.
pub fn utf16_to_char(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in s.chars().enumerate() {
        if units >= utf16_offset {
            return i;
        }
        units += c.len_utf16();
    }
    len_chars(s)
}

/// Convert a char offset into a UTF-16 code unit offset.
pub fn char_to_utf16(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Char offset of the first occurrence of `needle` in `haystack`.
pub fn find_chars(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| byte_to_char(haystack, byte))
}

/// Replace the char range `start..end` of `s` with `text`.
pub fn splice(s: &str, start: usize, end: usize, text: &str) -> String {
    let start = char_to_byte(s, start);
    let end = char_to_byte(s, end).max(start);
    let mut out = String::with_capacity(s.len() - (end - start) + text.len());
    out.push_str(&s[..start]);
    out.push_str(text);
    out.push_str(&s[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_conversion() {
        // "hi 🌍!" - the emoji is 4 bytes, 2 UTF-16 units, 1 char
        let s = "hi 🌍!";
        assert_eq!(char_to_byte(s, 3), 3);
        assert_eq!(char_to_byte(s, 4), 7);
        assert_eq!(char_to_byte(s, 99), s.len());
        assert_eq!(byte_to_char(s, 7), 4);

        assert_eq!(char_to_utf16(s, 4), 5);
        assert_eq!(utf16_to_char(s, 5), 4);
        assert_eq!(utf16_to_char(s, 4), 4);
        assert_eq!(utf16_to_char(s, 100), 5);
    }

    #[test]
    fn test_find_and_splice() {
        let s = "日本 [x] end";
        assert_eq!(find_chars(s, "[x]"), Some(3));
        assert_eq!(find_chars(s, "[y]"), None);
        assert_eq!(splice(s, 3, 6, "ok"), "日本 ok end");
        assert_eq!(splice("abc", 1, 1, "-"), "a-bc");
    }
}
