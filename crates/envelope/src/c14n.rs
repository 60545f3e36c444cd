//! Exclusive canonicalization.
//!
//! Produces the stable byte form of a subtree for digest computation:
//! namespace declarations are minimized to visibly-used bindings and sorted,
//! attributes are sorted and reduced to their local names, comments and
//! processing instructions are dropped, and no self-closing tags are emitted.
//! The form is independent of attribute order and of declaration order in
//! the source document, and identical whether the subtree was built by this
//! crate or parsed back from its serialized output.

use std::collections::BTreeMap;

use xmltree::Element;

use crate::xml;

/// Canonical byte form of a subtree.
pub fn canonicalize(el: &Element) -> Vec<u8> {
    let mut out = String::new();
    xml::render(el, &BTreeMap::new(), true, &mut out);
    out.into_bytes()
}
