//! Callback registrations.
//!
//! Three registration kinds, dispatched in this order at a tag boundary:
//! exact-name hooks in registration order, then any-element hooks in
//! registration order. The selector engine occupies a single slot in the
//! any-element list, claimed lazily on first selector registration so that
//! parsers without selectors pay nothing for it.

use crate::parser::Visit;

pub type Hook = Box<dyn FnMut(&mut Visit<'_>)>;

/// Exact-name registration, matched by byte-for-byte comparison against the
/// raw tag-name span. Case sensitive, no decoding on the hot path.
pub struct ElementHook {
    pub name: Vec<u8>,
    pub enter: Hook,
    pub exit: Option<Hook>,
}

pub enum AnyElement {
    User { enter: Hook, exit: Option<Hook> },
    /// Placeholder slot for selector evaluation, at most one per registry.
    Selectors,
}

#[derive(Default)]
pub struct Registry {
    pub element: Vec<ElementHook>,
    pub any: Vec<AnyElement>,
    pub text: Vec<Hook>,
}

impl Registry {
    /// Claim the selector slot. Idempotent.
    pub fn hook_selectors(&mut self) {
        if !self.any.iter().any(|h| matches!(h, AnyElement::Selectors)) {
            self.any.push(AnyElement::Selectors);
        }
    }
}
