//! Public parser surface.
//!
//! `Parser` owns the input buffer and the tokenizer state; callbacks receive
//! a `Visit` cursor whose lifetime is the callback invocation, which is what
//! makes the accessors safe: the buffer cannot compact or be overwritten
//! while a `Visit` borrow is alive.

use std::borrow::Cow;

use crate::core::attributes::{self, Attributes};
use crate::core::buffer::InputBuffer;
use crate::core::encoding::TextEncoding;
use crate::core::registry::{AnyElement, ElementHook, Hook};
use crate::core::tokenizer::{self, Machine};
use crate::error::Result;
use crate::Error;

/// Construction options. The buffer must hold the largest in-flight
/// construct plus one incoming chunk; double the largest expected chunk is
/// a sound lower bound.
#[derive(Debug, Clone)]
pub struct Options {
    pub buffer_size: usize,
    pub encoding: TextEncoding,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            buffer_size: 128 * 1024,
            encoding: TextEncoding::Utf8,
        }
    }
}

/// Incremental push-based XML parser.
///
/// Feed it byte chunks with [`push`](Parser::push) (or a whole document
/// with [`parse`](Parser::parse)); registered callbacks fire synchronously
/// as tag and text boundaries are recognized. Anything nobody registered
/// interest in is skipped without decoding.
pub struct Parser {
    storage: InputBuffer,
    machine: Machine,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Parser {
            storage: InputBuffer::with_capacity(options.buffer_size),
            machine: Machine::new(options.encoding),
        }
    }

    /// Register interest in elements. `pattern` is an exact tag name, or a
    /// selector when it contains a space or comma (`"Feed entry"`,
    /// `"a > b, c"`). The callback fires when a matching tag is entered.
    pub fn on_element(&mut self, pattern: &str, enter: impl FnMut(&mut Visit<'_>) + 'static) {
        self.register_element(pattern, Box::new(enter), None);
    }

    /// Like [`on_element`](Parser::on_element), with a second callback fired
    /// when the matching tag closes (immediately after `enter` for
    /// self-closing tags).
    pub fn on_element_with_exit(
        &mut self,
        pattern: &str,
        enter: impl FnMut(&mut Visit<'_>) + 'static,
        exit: impl FnMut(&mut Visit<'_>) + 'static,
    ) {
        self.register_element(pattern, Box::new(enter), Some(Box::new(exit)));
    }

    /// Fires on every element regardless of name.
    pub fn on_any_element(&mut self, enter: impl FnMut(&mut Visit<'_>) + 'static) {
        self.machine.hooks.any.push(AnyElement::User {
            enter: Box::new(enter),
            exit: None,
        });
    }

    pub fn on_any_element_with_exit(
        &mut self,
        enter: impl FnMut(&mut Visit<'_>) + 'static,
        exit: impl FnMut(&mut Visit<'_>) + 'static,
    ) {
        self.machine.hooks.any.push(AnyElement::User {
            enter: Box::new(enter),
            exit: Some(Box::new(exit)),
        });
    }

    /// Fires once per contiguous run of non-markup bytes; the content is
    /// read through [`Visit::text`].
    pub fn on_text_node(&mut self, callback: impl FnMut(&mut Visit<'_>) + 'static) {
        self.machine.hooks.text.push(Box::new(callback));
    }

    fn register_element(&mut self, pattern: &str, enter: Hook, exit: Option<Hook>) {
        if pattern.contains([' ', ',']) {
            self.machine.selectors.register(pattern, enter, exit);
            self.machine.hooks.hook_selectors();
        } else {
            self.machine.hooks.element.push(ElementHook {
                name: pattern.as_bytes().to_vec(),
                enter,
                exit,
            });
        }
    }

    /// Ingest a chunk, firing callbacks for every boundary it completes.
    ///
    /// Compacts the buffer when the chunk does not fit as-is; fails with
    /// [`Error::BufferOverflow`] if it still does not fit, leaving the
    /// parser exactly as it was before the call.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if self.machine.aborted {
            return Ok(());
        }

        let appended = self.storage.append(chunk)?;
        if appended.shift > 0 {
            self.machine.rebase(appended.shift);
        }
        tokenizer::run(&mut self.machine, self.storage.as_slice(), appended.start);
        self.storage.set_consumed(self.machine.low_water);
        Ok(())
    }

    /// One-shot ingestion over a caller-owned buffer, avoiding the copy
    /// into internal storage. Rewinds scanning state before and after, so
    /// any partially buffered streaming state is discarded.
    pub fn parse(&mut self, data: &[u8]) -> Result<()> {
        if self.machine.aborted {
            return Ok(());
        }

        self.storage.clear();
        self.machine.rewind();
        tokenizer::run(&mut self.machine, data, 0);
        self.machine.rewind();
        Ok(())
    }

    /// Return to the initial reusable state: empties the buffer, rewinds
    /// the cursor and clears the abort latch. Registrations are kept.
    pub fn reset(&mut self) {
        self.storage.clear();
        self.machine.reset();
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Enter,
    Exit,
    Text,
}

/// Cursor handed to callbacks. Borrows the parser's buffer for the duration
/// of the callback; data read through it must be copied out if needed after
/// the callback returns.
pub struct Visit<'p> {
    buf: &'p [u8],
    phase: Phase,
    span: (usize, usize),
    attrs: (usize, usize),
    encoding: TextEncoding,
    aborted: &'p mut bool,
}

impl<'p> Visit<'p> {
    pub(crate) fn new(
        buf: &'p [u8],
        phase: Phase,
        span: (usize, usize),
        attrs: (usize, usize),
        encoding: TextEncoding,
        aborted: &'p mut bool,
    ) -> Self {
        Visit {
            buf,
            phase,
            span,
            attrs,
            encoding,
            aborted,
        }
    }

    /// Raw tag-name bytes. Empty inside a text-node callback.
    pub fn tag_name(&self) -> &[u8] {
        match self.phase {
            Phase::Text => &[],
            Phase::Enter | Phase::Exit => &self.buf[self.span.0..self.span.1],
        }
    }

    /// Decode the attribute section of the tag being entered. Re-scans the
    /// span on every call; callers wanting the map twice should keep it.
    ///
    /// Only valid inside an enter callback.
    pub fn attributes(&self) -> Result<Attributes> {
        if self.phase != Phase::Enter {
            return Err(Error::InvalidAccess);
        }
        attributes::parse(&self.buf[self.attrs.0..self.attrs.1], self.encoding)
    }

    /// The text run's decoded content. Only valid inside a text-node
    /// callback.
    pub fn text(&self) -> Result<Cow<'_, str>> {
        if self.phase != Phase::Text {
            return Err(Error::InvalidAccess);
        }
        Ok(self.encoding.decode(&self.buf[self.span.0..self.span.1]))
    }

    /// Stop all further processing. The latch persists across `push` and
    /// `parse` calls until [`Parser::reset`].
    pub fn abort(&mut self) {
        log::trace!(target: "xmlsieve.parser", "abort latched");
        *self.aborted = true;
    }
}
