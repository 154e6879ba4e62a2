//! Reference extraction over a single tree.

use crate::node::UiNode;
use std::collections::BTreeSet;

/// Widget keys referenced anywhere inside `tree`, in first-seen document order.
///
/// Does not cross schema boundaries: only refs literally present in this
/// tree are reported. Opaque nodes contribute nothing.
pub fn extract_refs(tree: &UiNode) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut refs = Vec::new();
    walk(tree, &mut seen, &mut refs);
    refs
}

fn walk<'a>(node: &'a UiNode, seen: &mut BTreeSet<&'a str>, refs: &mut Vec<String>) {
    let Some(element) = node.as_element() else {
        return;
    };
    if let Some(widget_key) = element.schema_ref.as_deref()
        && seen.insert(widget_key)
    {
        refs.push(widget_key.to_string());
    }
    // Reference nodes normally have no children; walk them anyway.
    for child in element.children() {
        walk(child, seen, refs);
    }
}
