//! Buffer management, tokenization and callback dispatch.

pub mod attributes;
pub mod buffer;
pub mod encoding;
pub mod entities;
pub mod registry;
pub mod scanner;
pub mod tokenizer;
