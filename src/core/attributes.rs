//! Lazy attribute decoding.
//!
//! The tokenizer never parses attributes itself; it only records the byte
//! span between the tag name and the closing `>`. This module scans that
//! span on demand, once per accessor call, with a small sub-state machine:
//! skip whitespace, read a name, then either an `=` introduces a value or
//! the attribute is a bare flag.

use std::collections::HashMap;

use crate::core::encoding::TextEncoding;
use crate::core::entities;
use crate::core::scanner;
use crate::error::Error;

/// A decoded attribute value. Bare names (`<tag disabled>`) decode to `Flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Flag,
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Flag => None,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, AttrValue::Flag)
    }
}

pub type Attributes = HashMap<String, AttrValue>;

/// Decode an attribute span. Later duplicates win. Values pass through
/// character-reference decoding; names do not.
///
/// Quoted values follow the tokenizer's escape rule: a `"` preceded by `\`
/// does not terminate the value, and the backslash is kept verbatim. A span
/// that ends inside an open quote is malformed.
pub fn parse(bytes: &[u8], encoding: TextEncoding) -> Result<Attributes, Error> {
    let mut attrs = Attributes::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && scanner::is_whitespace(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !scanner::is_whitespace(bytes[i]) && bytes[i] != scanner::EQUAL {
            i += 1;
        }
        let name = encoding.decode(&bytes[name_start..i]).into_owned();

        if i >= bytes.len() || scanner::is_whitespace(bytes[i]) {
            if !name.is_empty() {
                attrs.insert(name, AttrValue::Flag);
            }
            continue;
        }

        // bytes[i] is '='
        i += 1;
        let raw = if i < bytes.len() && bytes[i] == scanner::QUOTE {
            i += 1;
            let value_start = i;
            loop {
                match scanner::find_quote(bytes, i) {
                    Some(q) if q > value_start && bytes[q - 1] == scanner::BACKSLASH => {
                        i = q + 1;
                    }
                    Some(q) => {
                        i = q + 1;
                        break &bytes[value_start..q];
                    }
                    None => return Err(Error::MalformedAttributes),
                }
            }
        } else {
            let value_start = i;
            while i < bytes.len() && !scanner::is_whitespace(bytes[i]) {
                i += 1;
            }
            &bytes[value_start..i]
        };

        let decoded = encoding.decode(raw);
        let value = entities::decode_refs(&decoded).into_owned();
        attrs.insert(name, AttrValue::Text(value));
    }

    Ok(attrs)
}
