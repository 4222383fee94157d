//! Error types for the parser.
//!
//! Flat error hierarchy. Every error is surfaced synchronously to the caller
//! of the operation that triggered it; nothing is retried internally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A pushed chunk does not fit in the buffer even after compaction.
    ///
    /// The parser state is unchanged by the failed call. The configured
    /// capacity should be at least double the largest expected chunk.
    #[error("chunk of {chunk} bytes exceeds free buffer space ({available} bytes after compaction)")]
    BufferOverflow { chunk: usize, available: usize },

    /// An accessor was called outside its valid callback window.
    #[error("accessor called outside its callback window")]
    InvalidAccess,

    /// The attribute section of the current tag ends inside an open quote.
    #[error("attribute section ends inside a quoted value")]
    MalformedAttributes,

    /// Whole-buffer parse failure.
    #[error("parse failed: {0}")]
    Parse(String),
}
