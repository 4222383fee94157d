//! Sliding input buffer for streaming ingestion.
//!
//! A single fixed-capacity byte store delimited by two offsets: `consumed`
//! marks the leftmost byte an in-flight construct may still reference,
//! `filled` is one past the last valid byte. Invariant:
//! `0 <= consumed <= filled <= capacity`. Compaction copies
//! `[consumed, filled)` down to offset 0 to reclaim dead space; the caller
//! rebases its recorded offsets by the reported shift.

use crate::error::Error;

pub struct InputBuffer {
    data: Box<[u8]>,
    consumed: usize,
    filled: usize,
}

/// Result of a successful append.
#[derive(Debug)]
pub struct Appended {
    /// Offset where the new chunk starts; scanning resumes here.
    pub start: usize,
    /// How far existing bytes were shifted left by compaction (0 if none).
    pub shift: usize,
}

impl InputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        InputBuffer {
            data: vec![0u8; capacity].into_boxed_slice(),
            consumed: 0,
            filled: 0,
        }
    }

    /// The valid portion of the buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Advance the consumed watermark. Never moves backwards.
    pub fn set_consumed(&mut self, pos: usize) {
        debug_assert!(pos <= self.filled);
        if pos > self.consumed {
            self.consumed = pos.min(self.filled);
        }
    }

    /// Append a chunk, compacting first if it does not fit as-is.
    ///
    /// Fails with `BufferOverflow` before any byte is copied, so the buffer
    /// is unchanged and the caller may retry after reconstruction with a
    /// larger capacity.
    pub fn append(&mut self, chunk: &[u8]) -> Result<Appended, Error> {
        let mut shift = 0;

        if self.filled + chunk.len() > self.data.len() {
            let live = self.filled - self.consumed;
            if live + chunk.len() > self.data.len() {
                log::debug!(
                    target: "xmlsieve.buffer",
                    "chunk of {} bytes rejected, {} live bytes pin the buffer",
                    chunk.len(),
                    live
                );
                return Err(Error::BufferOverflow {
                    chunk: chunk.len(),
                    available: self.data.len() - live,
                });
            }

            log::debug!(
                target: "xmlsieve.buffer",
                "compacting: dropping {} consumed bytes, {} live bytes kept",
                self.consumed,
                live
            );
            self.data.copy_within(self.consumed..self.filled, 0);
            shift = self.consumed;
            self.consumed = 0;
            self.filled = live;
        }

        let start = self.filled;
        self.data[start..start + chunk.len()].copy_from_slice(chunk);
        self.filled += chunk.len();

        Ok(Appended { start, shift })
    }

    /// Rewind to the empty state for reuse.
    pub fn clear(&mut self) {
        self.consumed = 0;
        self.filled = 0;
    }
}
