//! XML tree helpers shared by the build and interpretation pipeline.
//!
//! The envelope is held as an [`xmltree::Element`] tree. Serialization is
//! done by an in-crate writer so that the emitted bytes are deterministic:
//! namespace declarations are minimized against the enclosing scope and
//! sorted, attributes are sorted, and no self-closing tags are produced.
//! The same writer, with attribute prefixes stripped, produces the
//! canonical form used for digests (see [`crate::c14n`]).
//!
//! Namespace declarations travel in two shapes: trees built by this crate
//! carry them as literal `xmlns:*` attributes, while trees parsed from the
//! wire carry them in [`Element::namespaces`]. The writer understands both.

use std::collections::BTreeMap;

use xmltree::{Element, XMLNode};

/// Creates a prefixed element.
pub(crate) fn qualified(prefix: &str, local: &str) -> Element {
    let mut el = Element::new(local);
    el.prefix = Some(prefix.to_string());
    el
}

/// Creates a prefixed element with a single text child.
pub(crate) fn qualified_text(prefix: &str, local: &str, text: impl Into<String>) -> Element {
    let mut el = qualified(prefix, local);
    el.children.push(XMLNode::Text(text.into()));
    el
}

/// Sets an attribute (including `xmlns:*` declarations on built trees).
pub(crate) fn set_attr(el: &mut Element, name: &str, value: &str) {
    el.attributes.insert(name.to_string(), value.to_string());
}

/// Appends a child element.
pub(crate) fn push(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

/// Concatenated text and CDATA content of an element.
pub fn text_of(el: &Element) -> String {
    el.children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(t) | XMLNode::CData(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

/// Text content with all whitespace stripped, for base64 values that may be
/// line-wrapped on the wire.
pub fn compact_text(el: &Element) -> String {
    text_of(el).split_whitespace().collect()
}

/// First direct child with the given local name, regardless of prefix.
pub fn child<'a>(el: &'a Element, local: &str) -> Option<&'a Element> {
    el.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|c| c.name == local)
}

/// First element with the given local name in document order, starting with
/// `el` itself.
pub fn descendant<'a>(el: &'a Element, local: &str) -> Option<&'a Element> {
    if el.name == local {
        return Some(el);
    }
    el.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|c| descendant(c, local))
}

/// Mutable variant of [`descendant`].
pub(crate) fn descendant_mut<'a>(el: &'a mut Element, local: &str) -> Option<&'a mut Element> {
    if el.name == local {
        return Some(el);
    }
    el.children
        .iter_mut()
        .filter_map(XMLNode::as_mut_element)
        .find_map(|c| descendant_mut(c, local))
}

/// Collects every element with the given local name in document order.
pub fn collect_descendants<'a>(el: &'a Element, local: &str, out: &mut Vec<&'a Element>) {
    if el.name == local {
        out.push(el);
    }
    for child in el.children.iter().filter_map(XMLNode::as_element) {
        collect_descendants(child, local, out);
    }
}

/// Element carrying an `Id` (or `*:Id`) attribute with the given value.
pub fn find_by_id<'a>(el: &'a Element, id: &str) -> Option<&'a Element> {
    let hit = el
        .attributes
        .iter()
        .any(|(k, v)| (k == "Id" || k.ends_with(":Id")) && v == id);
    if hit {
        return Some(el);
    }
    el.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|c| find_by_id(c, id))
}

/// Replaces the first element with the given local name, returning the
/// replaced subtree.
pub(crate) fn replace_descendant(
    el: &mut Element,
    local: &str,
    replacement: Element,
) -> Option<Element> {
    let mut replacement = Some(replacement);
    replace_inner(el, local, &mut replacement)
}

fn replace_inner(
    el: &mut Element,
    local: &str,
    replacement: &mut Option<Element>,
) -> Option<Element> {
    for node in el.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            if child.name == local {
                if let Some(rep) = replacement.take() {
                    return Some(std::mem::replace(child, rep));
                }
                return None;
            }
            if let Some(old) = replace_inner(child, local, replacement) {
                return Some(old);
            }
        }
    }
    None
}

/// Serializes an element as a standalone document with an XML declaration.
pub fn write_document(el: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    render(el, &BTreeMap::new(), false, &mut out);
    out
}

/// Core writer shared by document serialization and canonicalization.
///
/// `inherited` is the namespace scope already emitted by ancestors; only
/// bindings that differ from it are declared. With `strip_attr_prefix` set
/// (the canonical form), attribute names are reduced to their local part so
/// that the byte form does not depend on attribute prefixes surviving a
/// parse round trip.
pub(crate) fn render(
    el: &Element,
    inherited: &BTreeMap<String, String>,
    strip_attr_prefix: bool,
    out: &mut String,
) {
    let qname = match el.prefix.as_deref() {
        Some(p) => format!("{p}:{}", el.name),
        None => el.name.clone(),
    };
    out.push('<');
    out.push_str(&qname);

    let mut scope = inherited.clone();
    let mut decls: BTreeMap<String, String> = BTreeMap::new();

    // Declarations carried as literal attributes (built trees).
    for (key, value) in &el.attributes {
        if key == "xmlns" {
            consider_decl(&mut decls, &mut scope, "", value);
        } else if let Some(p) = key.strip_prefix("xmlns:") {
            consider_decl(&mut decls, &mut scope, p, value);
        }
    }

    // The element's own binding (parsed trees resolve it from the
    // in-scope namespace map attached by the parser).
    let own_prefix = el.prefix.clone().unwrap_or_default();
    if let Some(uri) = resolve_uri(el, &own_prefix) {
        consider_decl(&mut decls, &mut scope, &own_prefix, &uri);
    } else if own_prefix.is_empty() && scope.get("").is_some_and(|u| !u.is_empty()) {
        // An unqualified element under an inherited default namespace must
        // undeclare it.
        consider_decl(&mut decls, &mut scope, "", "");
    }

    for (p, uri) in &decls {
        if p.is_empty() {
            out.push_str(&format!(" xmlns=\"{}\"", escape_attr(uri)));
        } else {
            out.push_str(&format!(" xmlns:{}=\"{}\"", p, escape_attr(uri)));
        }
    }

    let mut attrs: BTreeMap<String, &str> = BTreeMap::new();
    for (key, value) in &el.attributes {
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let name = if strip_attr_prefix {
            key.rsplit(':').next().unwrap_or(key.as_str())
        } else {
            key.as_str()
        };
        attrs.insert(name.to_string(), value.as_str());
    }
    for (name, value) in &attrs {
        out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }

    out.push('>');
    for node in &el.children {
        match node {
            XMLNode::Element(child) => render(child, &scope, strip_attr_prefix, out),
            XMLNode::Text(t) | XMLNode::CData(t) => out.push_str(&escape_text(t)),
            XMLNode::Comment(_) | XMLNode::ProcessingInstruction(..) => {}
        }
    }
    out.push_str("</");
    out.push_str(&qname);
    out.push('>');
}

fn consider_decl(
    decls: &mut BTreeMap<String, String>,
    scope: &mut BTreeMap<String, String>,
    prefix: &str,
    uri: &str,
) {
    if prefix == "xml" || prefix == "xmlns" {
        return;
    }
    if scope.get(prefix).map(String::as_str) == Some(uri) {
        return;
    }
    if prefix.is_empty() && uri.is_empty() && !scope.contains_key("") {
        return;
    }
    decls.insert(prefix.to_string(), uri.to_string());
    scope.insert(prefix.to_string(), uri.to_string());
}

fn resolve_uri(el: &Element, prefix: &str) -> Option<String> {
    if let Some(namespaces) = &el.namespaces {
        if let Some(uri) = namespaces.0.get(prefix) {
            if !uri.is_empty() {
                return Some(uri.clone());
            }
        }
    }
    if prefix == el.prefix.as_deref().unwrap_or("") {
        return el.namespace.clone();
    }
    None
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
