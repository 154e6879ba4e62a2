//! Tree resolution: expand reference nodes into the trees they name.
//!
//! Cycle detection uses the active path (keys being expanded from the root
//! down to the current node), not a whole-resolution visited set, so the
//! same widget may legitimately appear twice as siblings.

use crate::error::ResolveError;
use crate::node::{PlaceholderReason, UiElement, UiNode};
use crate::record::SchemaRecord;
use crate::store::{SchemaStore, fetch};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Caller-chosen bounds for one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Tree levels past which nodes are returned unexpanded.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolveOptions {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// Resolve `node` at `depth`, with `active_path` naming the keys already
/// being expanded above it.
///
/// Returns a new tree; the input and the stored records are left untouched.
/// Cycles and dangling references become placeholders; nodes deeper than
/// `options.max_depth` are returned as-is.
pub fn resolve<'a, S>(
    node: &'a UiNode,
    store: &'a S,
    depth: usize,
    options: &'a ResolveOptions,
    active_path: &'a [String],
) -> BoxFuture<'a, Result<UiNode, ResolveError>>
where
    S: SchemaStore + ?Sized,
{
    async move {
        if depth > options.max_depth {
            debug!(depth, max_depth = options.max_depth, "depth bound reached");
            return Ok(node.clone());
        }

        let UiNode::Element(element) = node else {
            return Ok(node.clone());
        };

        let Some(widget_key) = element.schema_ref.as_deref() else {
            let children = match &element.children {
                Some(children) => {
                    let mut resolved = Vec::with_capacity(children.len());
                    for child in children {
                        resolved
                            .push(resolve(child, store, depth + 1, options, active_path).await?);
                    }
                    Some(resolved)
                }
                None => None,
            };
            return Ok(UiNode::Element(UiElement {
                kind: element.kind.clone(),
                children,
                schema_ref: None,
                props: element.props.clone(),
            }));
        };

        if active_path.iter().any(|key| key == widget_key) {
            debug!(widget_key, ?active_path, "reference cycle");
            return Ok(UiNode::placeholder(widget_key, PlaceholderReason::Cycle));
        }

        let Some(record) = fetch(store, widget_key).await? else {
            warn!(widget_key, "dangling schema reference");
            return Ok(UiNode::placeholder(widget_key, PlaceholderReason::Missing));
        };

        debug!(widget_key, depth, "expanding schema reference");
        let mut path = active_path.to_vec();
        path.push(widget_key.to_string());
        resolve(&record.tree, store, depth + 1, options, &path).await
    }
    .boxed()
}

/// Resolve a bare tree from the top: depth 0, empty active path.
pub async fn resolve_tree<S>(
    tree: &UiNode,
    store: &S,
    options: &ResolveOptions,
) -> Result<UiNode, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    resolve(tree, store, 0, options, &[]).await
}

/// Resolve a record's tree with the record's own key on the active path.
pub async fn resolve_record<S>(
    record: &SchemaRecord,
    store: &S,
    options: &ResolveOptions,
) -> Result<UiNode, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let path = [record.widget_key.clone()];
    resolve(&record.tree, store, 0, options, &path).await
}

/// Look up `widget_key` and resolve its tree.
pub async fn resolve_schema<S>(
    widget_key: &str,
    store: &S,
    options: &ResolveOptions,
) -> Result<UiNode, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let record = fetch(store, widget_key)
        .await?
        .ok_or_else(|| ResolveError::RootNotFound(widget_key.to_string()))?;
    resolve_record(&record, store, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::store_from_records;
    use serde_json::json;

    fn panel(children: Vec<UiNode>) -> UiNode {
        UiNode::element("panel").with_children(children)
    }

    #[tokio::test]
    async fn ref_free_tree_is_unchanged() {
        let tree: UiNode = serde_json::from_value(json!({
            "kind": "column",
            "gap": 4,
            "children": [{"kind": "text", "text": "Orders"}, "raw", {"kind": "row"}],
        }))
        .expect("tree should parse");
        let store = store_from_records([]);

        let resolved = resolve_tree(&tree, &store, &ResolveOptions::default())
            .await
            .expect("resolution should succeed");
        assert_eq!(resolved, tree);
    }

    #[tokio::test]
    async fn ref_free_tree_serializes_back_to_its_input() {
        let raw = json!({
            "kind": "column",
            "children": [
                {"text": "label without kind"},
                {"kind": "row", "children": []},
            ],
        });
        let tree: UiNode = serde_json::from_value(raw.clone()).expect("tree should parse");
        let store = store_from_records([]);

        let resolved = resolve_tree(&tree, &store, &ResolveOptions::default())
            .await
            .expect("resolution should succeed");
        assert_eq!(serde_json::to_value(&resolved).expect("serialize"), raw);
    }

    #[tokio::test]
    async fn reference_fields_are_discarded_on_expansion() {
        let store = store_from_records([SchemaRecord::new(
            "w.price",
            UiNode::element("text").with_prop("text", json!("42")),
        )]);
        let tree = panel(vec![
            UiNode::reference("w.price").with_prop("style", json!({"flex": 1})),
        ]);

        let resolved = resolve_tree(&tree, &store, &ResolveOptions::default())
            .await
            .expect("resolution should succeed");
        assert_eq!(
            resolved,
            panel(vec![UiNode::element("text").with_prop("text", json!("42"))])
        );
    }

    #[tokio::test]
    async fn siblings_may_reuse_the_same_schema() {
        let store = store_from_records([SchemaRecord::new("w.ticker", UiNode::element("ticker"))]);
        let tree = panel(vec![
            UiNode::reference("w.ticker"),
            UiNode::reference("w.ticker"),
        ]);

        let resolved = resolve_tree(&tree, &store, &ResolveOptions::default())
            .await
            .expect("resolution should succeed");
        assert_eq!(
            resolved,
            panel(vec![UiNode::element("ticker"), UiNode::element("ticker")])
        );
    }

    #[tokio::test]
    async fn self_reference_collapses_to_placeholder() {
        let store = store_from_records([SchemaRecord::new(
            "w.loop",
            panel(vec![UiNode::reference("w.loop")]),
        )]);

        let resolved = resolve_schema("w.loop", &store, &ResolveOptions::default())
            .await
            .expect("resolution should succeed");
        assert_eq!(
            resolved,
            panel(vec![UiNode::placeholder("w.loop", PlaceholderReason::Cycle)])
        );
    }

    #[tokio::test]
    async fn depth_zero_expands_nothing_below_the_root() {
        let store = store_from_records([SchemaRecord::new("w.a", UiNode::element("a"))]);
        let tree = panel(vec![UiNode::reference("w.a")]);

        let resolved = resolve_tree(&tree, &store, &ResolveOptions::with_max_depth(0))
            .await
            .expect("resolution should succeed");
        assert_eq!(resolved, tree);
    }

    #[tokio::test]
    async fn missing_root_is_reported() {
        let store = store_from_records([]);
        let err = resolve_schema("w.none", &store, &ResolveOptions::default())
            .await
            .expect_err("missing root should fail");
        assert!(matches!(err, ResolveError::RootNotFound(key) if key == "w.none"));
    }
}
