//! Export collection: every distinct record reachable from a root key.
//!
//! Unlike resolution, visiting is tracked across the whole graph: a key
//! already exported is never processed again, whichever path reaches it.

use crate::error::ResolveError;
use crate::record::SchemaRecord;
use crate::refs::extract_refs;
use crate::store::{SchemaStore, fetch};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Collect `root_key` and everything it depends on, root first.
///
/// Dependencies are the record's `nested_schemas` followed by the refs
/// literally present in its tree, each visited in that discovery order.
/// Missing keys are skipped.
pub fn collect_for_export<'a, S>(
    root_key: &'a str,
    store: &'a S,
    visited: &'a mut BTreeSet<String>,
) -> BoxFuture<'a, Result<Vec<SchemaRecord>, ResolveError>>
where
    S: SchemaStore + ?Sized,
{
    async move {
        if visited.contains(root_key) {
            return Ok(Vec::new());
        }
        let Some(record) = fetch(store, root_key).await? else {
            warn!(widget_key = root_key, "export skipped missing schema");
            return Ok(Vec::new());
        };
        visited.insert(root_key.to_string());

        let mut dependencies = record.nested_schemas.clone();
        for widget_key in extract_refs(&record.tree) {
            if !dependencies.contains(&widget_key) {
                dependencies.push(widget_key);
            }
        }
        debug!(widget_key = root_key, ?dependencies, "collecting for export");

        let mut collected = vec![record];
        for widget_key in &dependencies {
            let nested = collect_for_export(widget_key, store, &mut *visited).await?;
            collected.extend(nested);
        }
        Ok(collected)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::UiNode;
    use crate::store::store_from_records;

    fn keys(records: &[SchemaRecord]) -> Vec<&str> {
        records.iter().map(|r| r.widget_key.as_str()).collect()
    }

    #[tokio::test]
    async fn diamond_is_exported_once_per_key() {
        let store = store_from_records([
            SchemaRecord::new(
                "w.top",
                UiNode::element("row")
                    .with_children(vec![UiNode::reference("w.left"), UiNode::reference("w.right")]),
            ),
            SchemaRecord::new("w.left", UiNode::reference("w.base")),
            SchemaRecord::new("w.right", UiNode::reference("w.base")),
            SchemaRecord::new("w.base", UiNode::element("text")),
        ]);

        let mut visited = BTreeSet::new();
        let records = collect_for_export("w.top", &store, &mut visited)
            .await
            .expect("export should succeed");
        assert_eq!(keys(&records), vec!["w.top", "w.left", "w.base", "w.right"]);
    }

    #[tokio::test]
    async fn cycles_and_missing_keys_terminate() {
        let store = store_from_records([
            SchemaRecord::new("w.a", UiNode::reference("w.b")).with_nested("w.ghost"),
            SchemaRecord::new("w.b", UiNode::reference("w.a")),
        ]);

        let mut visited = BTreeSet::new();
        let records = collect_for_export("w.a", &store, &mut visited)
            .await
            .expect("export should succeed");
        assert_eq!(keys(&records), vec!["w.a", "w.b"]);
        assert!(!visited.contains("w.ghost"));
    }

    #[tokio::test]
    async fn prior_visits_are_honored() {
        let store = store_from_records([SchemaRecord::new("w.a", UiNode::element("a"))]);
        let mut visited = BTreeSet::from(["w.a".to_string()]);
        let records = collect_for_export("w.a", &store, &mut visited)
            .await
            .expect("export should succeed");
        assert!(records.is_empty());
    }
}
