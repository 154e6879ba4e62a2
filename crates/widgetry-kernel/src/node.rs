//! UI node model: the tree shape every engine walk operates on.
//!
//! A node is either a well-formed element (content or reference) or an
//! opaque value the engine does not understand. Opaque values are carried
//! through every operation unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Element kind used for the harmless stand-in of an unexpandable reference.
pub const PLACEHOLDER_KIND: &str = "placeholder";
pub const PLACEHOLDER_REF_PROP: &str = "unresolvedRef";
pub const PLACEHOLDER_REASON_PROP: &str = "reason";

/// One element of a declarative UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiNode {
    Element(UiElement),
    /// Anything that is not an element-shaped object. Treated as a leaf.
    Opaque(Value),
}

/// A well-formed UI element.
///
/// With `schema_ref` set this is a reference node and stands in for the
/// tree of the named schema; its other fields are discarded on expansion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `None` when the input had no `children` field; an explicit empty
    /// list is kept so it survives a round trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<UiNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
    /// Styling, text, literal props: opaque pass-through data.
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

/// Why a reference was replaced by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    Cycle,
    Missing,
}

impl PlaceholderReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderReason::Cycle => "cycle",
            PlaceholderReason::Missing => "missing",
        }
    }
}

impl UiNode {
    /// A content node of the given kind with no children.
    pub fn element(kind: impl Into<String>) -> Self {
        UiNode::Element(UiElement {
            kind: Some(kind.into()),
            ..UiElement::default()
        })
    }

    /// A reference node standing in for `widget_key`.
    pub fn reference(widget_key: impl Into<String>) -> Self {
        UiNode::Element(UiElement {
            kind: Some("ref".to_string()),
            schema_ref: Some(widget_key.into()),
            ..UiElement::default()
        })
    }

    /// Empty content node left where a reference could not be expanded.
    pub fn placeholder(widget_key: &str, reason: PlaceholderReason) -> Self {
        UiNode::element(PLACEHOLDER_KIND)
            .with_prop(PLACEHOLDER_REF_PROP, Value::String(widget_key.to_string()))
            .with_prop(
                PLACEHOLDER_REASON_PROP,
                Value::String(reason.as_str().to_string()),
            )
    }

    /// Replace the children of an element. No-op on opaque nodes.
    pub fn with_children(mut self, children: Vec<UiNode>) -> Self {
        if let UiNode::Element(element) = &mut self {
            element.children = Some(children);
        }
        self
    }

    /// Set one opaque prop on an element. No-op on opaque nodes.
    pub fn with_prop(mut self, name: &str, value: Value) -> Self {
        if let UiNode::Element(element) = &mut self {
            element.props.insert(name.to_string(), value);
        }
        self
    }

    pub fn as_element(&self) -> Option<&UiElement> {
        match self {
            UiNode::Element(element) => Some(element),
            UiNode::Opaque(_) => None,
        }
    }

    /// The widget key this node stands in for, if it is a reference node.
    pub fn schema_ref(&self) -> Option<&str> {
        self.as_element()?.schema_ref.as_deref()
    }

    pub fn is_reference(&self) -> bool {
        self.schema_ref().is_some()
    }

    pub fn children(&self) -> &[UiNode] {
        match self {
            UiNode::Element(element) => element.children(),
            UiNode::Opaque(_) => &[],
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.as_element()?.kind.as_deref()
    }

    /// Whether this node is a placeholder left by the resolver.
    pub fn is_placeholder(&self) -> bool {
        self.as_element().is_some_and(|element| {
            element.kind.as_deref() == Some(PLACEHOLDER_KIND) && element.props.contains_key(PLACEHOLDER_REF_PROP)
        })
    }
}

impl UiElement {
    pub fn children(&self) -> &[UiNode] {
        self.children.as_deref().unwrap_or_default()
    }
}

impl Default for UiNode {
    fn default() -> Self {
        UiNode::Element(UiElement::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_roundtrips_opaque_props() {
        let raw = json!({
            "kind": "text",
            "style": {"color": "red"},
            "text": "Balance",
        });
        let node: UiNode = serde_json::from_value(raw.clone()).expect("node should parse");
        let element = node.as_element().expect("should be an element");
        assert_eq!(element.kind.as_deref(), Some("text"));
        assert_eq!(element.props["style"], json!({"color": "red"}));
        assert_eq!(serde_json::to_value(&node).expect("serialize"), raw);
    }

    #[test]
    fn reference_node_is_detected() {
        let node: UiNode = serde_json::from_value(json!({"kind": "ref", "schemaRef": "w.price"}))
            .expect("node should parse");
        assert!(node.is_reference());
        assert_eq!(node.schema_ref(), Some("w.price"));
    }

    #[test]
    fn malformed_shapes_become_opaque() {
        let cases = [
            json!("just text"),
            json!(42),
            json!({"kind": "row", "children": "not-a-list"}),
            json!({"kind": "ref", "schemaRef": 7}),
        ];
        for raw in cases {
            let node: UiNode = serde_json::from_value(raw.clone()).expect("any JSON parses");
            assert!(
                matches!(node, UiNode::Opaque(_)),
                "expected opaque for {raw}"
            );
            assert!(!node.is_reference());
            assert!(node.children().is_empty());
        }
    }

    #[test]
    fn opaque_children_survive_inside_elements() {
        let node: UiNode = serde_json::from_value(json!({
            "kind": "column",
            "children": ["label", {"kind": "ref", "schemaRef": "w.a"}],
        }))
        .expect("node should parse");
        assert_eq!(node.children().len(), 2);
        assert!(matches!(node.children()[0], UiNode::Opaque(_)));
        assert!(node.children()[1].is_reference());
    }

    #[test]
    fn absent_fields_stay_absent_and_empty_children_stay_empty() {
        let raw = json!({
            "kind": "column",
            "children": [
                {"text": "label without kind"},
                {"kind": "row", "children": []},
            ],
        });
        let node: UiNode = serde_json::from_value(raw.clone()).expect("node should parse");
        assert_eq!(node.children()[0].kind(), None);
        assert!(node.children()[1].children().is_empty());
        assert_eq!(serde_json::to_value(&node).expect("serialize"), raw);
    }

    #[test]
    fn placeholder_carries_reason() {
        let node = UiNode::placeholder("w.loop", PlaceholderReason::Cycle);
        assert!(node.is_placeholder());
        assert!(!node.is_reference());
        assert_eq!(
            serde_json::to_value(&node).expect("serialize"),
            json!({"kind": "placeholder", "unresolvedRef": "w.loop", "reason": "cycle"})
        );
    }
}
