//! Local-name path lookups over an XML tree
//!
//! A path such as `Fa/P_2` matches an element when the element's ancestry,
//! counted from the lookup context and including it, ends with the path
//! segments. Namespace prefixes never take part in matching. Candidates are
//! visited in document order, so the first structural match wins.

use regex::Regex;
use roxmltree::Node;
use rust_decimal::Decimal;

use super::amount;

/// First element under `context` (inclusive) matching `path`.
pub(crate) fn find<'a, 'input>(context: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let segments: Vec<&str> = path.split('/').collect();
    context
        .descendants()
        .filter(Node::is_element)
        .find(|node| matches_path(*node, context, &segments))
}

/// First element matching any of `paths`, tried in order.
pub(crate) fn find_any<'a, 'input>(
    context: Node<'a, 'input>,
    paths: &[&str],
) -> Option<Node<'a, 'input>> {
    paths.iter().find_map(|path| find(context, path))
}

/// Text of the first structural match among `paths`.
///
/// A matched element with blank text ends the search.
pub(crate) fn text_at(context: Node<'_, '_>, paths: &[&str]) -> Option<String> {
    find_any(context, paths).and_then(text_of)
}

/// First non-blank text among `paths`; blank matches fall through to the
/// next candidate.
pub(crate) fn first_text(context: Node<'_, '_>, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| find(context, path).and_then(text_of))
}

/// Trimmed, non-empty text content of an element.
pub(crate) fn text_of(node: Node<'_, '_>) -> Option<String> {
    non_blank(node.text())
}

/// Trimmed, non-empty attribute value (local name match).
pub(crate) fn attribute_of(node: Node<'_, '_>, name: &str) -> Option<String> {
    non_blank(node.attributes().find(|attr| attr.name() == name).map(|attr| attr.value()))
}

/// Every element under `root` (inclusive) with local name `name`, in order.
pub(crate) fn elements_named<'a, 'input>(
    root: Node<'a, 'input>,
    name: &str,
) -> Vec<Node<'a, 'input>> {
    root.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == name)
        .collect()
}

/// Sum of every parseable amount in elements whose local name matches
/// `pattern`; `None` when no such amount exists or the sum overflows.
pub(crate) fn sum_matching(root: Node<'_, '_>, pattern: &Regex) -> Option<Decimal> {
    let mut values = root
        .descendants()
        .filter(|node| node.is_element() && pattern.is_match(node.tag_name().name()))
        .filter_map(|node| node.text().and_then(amount::parse));
    let first = values.next()?;
    values.try_fold(first, Decimal::checked_add)
}

fn matches_path(node: Node<'_, '_>, context: Node<'_, '_>, segments: &[&str]) -> bool {
    let mut current = Some(node);
    for segment in segments.iter().rev() {
        let Some(candidate) = current else {
            return false;
        };
        if candidate.tag_name().name() != *segment {
            return false;
        }
        current = if candidate.id() == context.id() { None } else { candidate.parent_element() };
    }
    true
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
