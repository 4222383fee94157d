//! Incremental, push-based XML extraction.
//!
//! Built for pulling a known handful of elements, attributes and text runs
//! out of large or streamed XML without building a tree. Register interest
//! up front, feed bytes as they arrive, and callbacks fire synchronously at
//! tag and text boundaries. Nothing is decoded unless a callback asks for
//! it.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use xmlsieve::Parser;
//!
//! let mut parser = Parser::new();
//!
//! let direct_items = Rc::new(Cell::new(0u32));
//! let seen = direct_items.clone();
//! parser.on_element("Feed > Item", move |_visit| seen.set(seen.get() + 1));
//!
//! parser.push(b"<Feed><Item/><Other>")?;
//! parser.push(b"<Item/></Other></Feed>")?;
//!
//! assert_eq!(direct_items.get(), 1);
//! # Ok::<(), xmlsieve::Error>(())
//! ```
//!
//! Not a validating parser: malformed markup is skipped permissively, and
//! quoted attribute values use a backslash escape for embedded quotes
//! rather than full XML normalization.

mod core;
mod error;
mod parser;
mod selector;

pub use crate::core::attributes::{AttrValue, Attributes};
pub use crate::core::encoding::TextEncoding;
pub use crate::error::{Error, Result};
pub use crate::parser::{Options, Parser, Visit};
