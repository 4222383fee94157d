//! Text decoding for attribute values and text nodes.
//!
//! The tokenizer itself is byte oriented; decoding only happens when a
//! callback reads a span back out through the cursor.

use std::borrow::Cow;

/// Decoding scheme applied when byte spans are turned into strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    /// Decode a byte span. UTF-8 decoding is lossy: invalid sequences become
    /// U+FFFD rather than failing, matching the best-effort handling of the
    /// tokenizer itself.
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes),
            TextEncoding::Latin1 => match std::str::from_utf8(bytes) {
                // ASCII-only Latin-1 is valid UTF-8 as-is
                Ok(s) if bytes.is_ascii() => Cow::Borrowed(s),
                _ => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(TextEncoding::Utf8.decode("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_utf8_lossy() {
        let decoded = TextEncoding::Utf8.decode(&[b'a', 0xFF, b'b']);
        assert_eq!(decoded, "a\u{FFFD}b");
    }

    #[test]
    fn test_latin1() {
        assert_eq!(TextEncoding::Latin1.decode(&[b'a', 0xE9]), "aé");
    }

    #[test]
    fn test_latin1_ascii_borrows() {
        assert!(matches!(
            TextEncoding::Latin1.decode(b"plain"),
            Cow::Borrowed("plain")
        ));
    }
}
