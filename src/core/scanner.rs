//! SIMD-accelerated byte scanning using memchr
//!
//! Uses the memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! States that only wait for a single structural byte (text runs, comments,
//! quoted values, closing tags) jump with these helpers instead of stepping
//! byte by byte.

use memchr::memchr;

pub const TAG_START: u8 = b'<';
pub const TAG_END: u8 = b'>';
pub const TAG_CLOSE: u8 = b'/';
pub const QUESTION: u8 = b'?';
pub const BANG: u8 = b'!';
pub const EQUAL: u8 = b'=';
pub const QUOTE: u8 = b'"';
pub const BACKSLASH: u8 = b'\\';

/// Whitespace as the tokenizer understands it (space, tab, CR, LF).
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Find the next `<` at or after `from`.
#[inline]
pub fn find_tag_start(buf: &[u8], from: usize) -> Option<usize> {
    memchr(TAG_START, &buf[from..]).map(|i| from + i)
}

/// Find the next `>` at or after `from`.
#[inline]
pub fn find_tag_end(buf: &[u8], from: usize) -> Option<usize> {
    memchr(TAG_END, &buf[from..]).map(|i| from + i)
}

/// Find the next `"` at or after `from`.
#[inline]
pub fn find_quote(buf: &[u8], from: usize) -> Option<usize> {
    memchr(QUOTE, &buf[from..]).map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        assert_eq!(find_tag_start(b"hello <world>", 0), Some(6));
        assert_eq!(find_tag_start(b"hello <world>", 7), None);
    }

    #[test]
    fn test_find_tag_end() {
        assert_eq!(find_tag_end(b"<a>text", 0), Some(2));
        assert_eq!(find_tag_end(b"no end", 0), None);
    }

    #[test]
    fn test_find_quote() {
        assert_eq!(find_quote(b"a=\"b\"", 3), Some(4));
    }

    #[test]
    fn test_is_whitespace() {
        assert!(is_whitespace(b' '));
        assert!(is_whitespace(b'\t'));
        assert!(is_whitespace(b'\r'));
        assert!(is_whitespace(b'\n'));
        assert!(!is_whitespace(b'a'));
    }
}
