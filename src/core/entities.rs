//! XML character-reference decoding.
//!
//! Handles the predefined entities (`&lt;` `&gt;` `&amp;` `&quot;` `&apos;`)
//! and numeric character references (`&#NN;` / `&#xNN;`). Unknown references
//! are left untouched. Zero-copy when no `&` is present.

use memchr::memchr;
use std::borrow::Cow;

/// Expand character references in already-decoded text.
///
/// Returns Borrowed if no references are present (the common case),
/// Owned if anything was expanded.
pub fn decode_refs(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();

    // Fast path: no ampersand, nothing to do
    if memchr(b'&', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        match memchr(b'&', &bytes[pos..]) {
            Some(amp) => {
                out.push_str(&input[pos..pos + amp]);
                pos += amp;

                match memchr(b';', &bytes[pos..]) {
                    Some(semi) => {
                        let name = &input[pos + 1..pos + semi];
                        if let Some(decoded) = decode_ref(name) {
                            out.push(decoded);
                            pos += semi + 1;
                        } else {
                            // Unknown reference, keep as-is
                            out.push('&');
                            pos += 1;
                        }
                    }
                    None => {
                        // No terminating semicolon, keep the ampersand
                        out.push('&');
                        pos += 1;
                    }
                }
            }
            None => {
                out.push_str(&input[pos..]);
                break;
            }
        }
    }

    Cow::Owned(out)
}

/// Decode a single reference (without `&` and `;`).
fn decode_ref(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let codepoint = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(codepoint);
    }

    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
