//! CSS-like selector matching over the open-tag stack.
//!
//! The engine registers itself as a single any-element hook and maintains
//! its own stack of open tag names, pushed on enter and popped on exit.
//! Stack entries are owned copies, not buffer spans: the buffer may compact
//! between the push and a later match, which would invalidate any borrowed
//! span.

mod compile;

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::core::encoding::TextEncoding;
use crate::core::registry::Hook;
use crate::parser::{Phase, Visit};
use self::compile::Compiled;

/// Repeat registrations of the same selector string on this engine reuse
/// the compiled rule chains instead of recompiling.
const COMPILE_CACHE_SIZE: usize = 64;

struct SelectorHook {
    compiled: Compiled,
    enter: Hook,
    exit: Option<Hook>,
}

pub struct SelectorEngine {
    hooks: Vec<SelectorHook>,
    stack: Vec<Vec<u8>>,
    cache: LruCache<String, Compiled>,
}

impl SelectorEngine {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(COMPILE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        SelectorEngine {
            hooks: Vec::new(),
            stack: Vec::new(),
            cache: LruCache::new(capacity),
        }
    }

    pub fn register(&mut self, pattern: &str, enter: Hook, exit: Option<Hook>) {
        let compiled = match self.cache.get(pattern) {
            Some(cached) => cached.clone(),
            None => {
                let compiled = Compiled::new(pattern);
                log::trace!(target: "xmlsieve.selector", "compiled selector {pattern:?}");
                self.cache.put(pattern.to_string(), compiled.clone());
                compiled
            }
        };
        self.hooks.push(SelectorHook {
            compiled,
            enter,
            exit,
        });
    }

    pub fn enter(
        &mut self,
        buf: &[u8],
        span: (usize, usize),
        attrs: (usize, usize),
        encoding: TextEncoding,
        aborted: &mut bool,
    ) {
        let SelectorEngine { hooks, stack, .. } = self;
        stack.push(buf[span.0..span.1].to_vec());

        for hook in hooks.iter_mut() {
            if hook.compiled.matches(stack) {
                let mut visit = Visit::new(buf, Phase::Enter, span, attrs, encoding, aborted);
                (hook.enter)(&mut visit);
            }
        }
    }

    pub fn exit(
        &mut self,
        buf: &[u8],
        span: (usize, usize),
        attrs: (usize, usize),
        encoding: TextEncoding,
        aborted: &mut bool,
    ) {
        let SelectorEngine { hooks, stack, .. } = self;

        for hook in hooks.iter_mut() {
            if let Some(cb) = hook.exit.as_mut() {
                if hook.compiled.matches(stack) {
                    let mut visit = Visit::new(buf, Phase::Exit, span, attrs, encoding, aborted);
                    cb(&mut visit);
                }
            }
        }

        // Tolerate unbalanced input: a stray closing tag must not underflow
        stack.pop();
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }
}
