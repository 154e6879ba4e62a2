//! Channel collection: the flat, alias-safe binding list a composed tree needs.
//!
//! The walk mirrors [`crate::resolve`]: same depth bound, same path-local
//! cycle check, dangling refs skipped. Bindings merge pre-order: the root's
//! own bindings first, then each referenced schema in document order, each
//! schema's own bindings before those of its children.

use crate::error::ResolveError;
use crate::node::UiNode;
use crate::record::{ChannelBinding, SELF_ALIAS, SchemaRecord};
use crate::resolve::ResolveOptions;
use crate::store::{SchemaStore, fetch};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Accumulates bindings and guarantees alias uniqueness.
///
/// A nested schema's `self` is exposed as `<widget_key>:self`. An alias
/// already held by a different channel is retried as `<widget_key>:<alias>`
/// and then with a `#2`, `#3`, ... suffix. An identical pair collapses.
#[derive(Debug, Clone, Default)]
pub struct ChannelPlan {
    bindings: Vec<ChannelBinding>,
    channel_by_alias: BTreeMap<String, String>,
}

impl ChannelPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `alias` for `channel_key`, on behalf of the nested schema
    /// `scope` (or the root when `None`). Returns the alias actually bound.
    pub fn claim(&mut self, channel_key: &str, alias: &str, scope: Option<&str>) -> String {
        let (requested, base) = match scope {
            Some(widget_key) if alias == SELF_ALIAS => {
                let scoped = format!("{widget_key}:{SELF_ALIAS}");
                (scoped.clone(), scoped)
            }
            Some(widget_key) => (alias.to_string(), format!("{widget_key}:{alias}")),
            None => (alias.to_string(), alias.to_string()),
        };

        if self.try_bind(channel_key, &requested) {
            return requested;
        }
        if base != requested && self.try_bind(channel_key, &base) {
            return base;
        }

        let mut suffix = 2usize;
        loop {
            let candidate = format!("{base}#{suffix}");
            if self.try_bind(channel_key, &candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn try_bind(&mut self, channel_key: &str, alias: &str) -> bool {
        match self.channel_by_alias.get(alias) {
            Some(existing) => existing == channel_key,
            None => {
                self.channel_by_alias
                    .insert(alias.to_string(), channel_key.to_string());
                self.bindings.push(ChannelBinding::new(channel_key, alias));
                true
            }
        }
    }

    /// Merge every binding a record declares directly.
    pub fn claim_record(&mut self, record: &SchemaRecord, scope: Option<&str>) {
        for binding in record.own_bindings() {
            let bound = self.claim(&binding.channel_key, &binding.alias, scope);
            if bound != binding.alias {
                debug!(
                    channel_key = %binding.channel_key,
                    requested = %binding.alias,
                    bound = %bound,
                    "alias renamed on merge"
                );
            }
        }
    }

    pub fn bindings(&self) -> &[ChannelBinding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<ChannelBinding> {
        self.bindings
    }
}

fn walk<'a, S>(
    node: &'a UiNode,
    store: &'a S,
    depth: usize,
    options: &'a ResolveOptions,
    active_path: &'a [String],
    plan: &'a mut ChannelPlan,
) -> BoxFuture<'a, Result<(), ResolveError>>
where
    S: SchemaStore + ?Sized,
{
    async move {
        if depth > options.max_depth {
            return Ok(());
        }
        let Some(element) = node.as_element() else {
            return Ok(());
        };

        let Some(widget_key) = element.schema_ref.as_deref() else {
            for child in element.children() {
                walk(child, store, depth + 1, options, active_path, &mut *plan).await?;
            }
            return Ok(());
        };

        if active_path.iter().any(|key| key == widget_key) {
            debug!(widget_key, "reference cycle; no further channels");
            return Ok(());
        }
        let Some(record) = fetch(store, widget_key).await? else {
            warn!(widget_key, "dangling schema reference; no channels");
            return Ok(());
        };

        plan.claim_record(&record, Some(widget_key));
        let mut path = active_path.to_vec();
        path.push(widget_key.to_string());
        walk(&record.tree, store, depth + 1, options, &path, plan).await
    }
    .boxed()
}

/// Channels required by `root` composed with everything it references.
///
/// The root's `self` binding is the only one exposed as `self`.
pub async fn collect_channels<S>(
    root: &SchemaRecord,
    store: &S,
    options: &ResolveOptions,
) -> Result<Vec<ChannelBinding>, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let mut plan = ChannelPlan::new();
    plan.claim_record(root, None);
    let path = [root.widget_key.clone()];
    walk(&root.tree, store, 0, options, &path, &mut plan).await?;
    Ok(plan.into_bindings())
}

/// Channels required by the schemas a bare tree references.
pub async fn collect_tree_channels<S>(
    tree: &UiNode,
    store: &S,
    options: &ResolveOptions,
) -> Result<Vec<ChannelBinding>, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let mut plan = ChannelPlan::new();
    walk(tree, store, 0, options, &[], &mut plan).await?;
    Ok(plan.into_bindings())
}

/// Look up `widget_key` and collect its channels.
pub async fn collect_schema_channels<S>(
    widget_key: &str,
    store: &S,
    options: &ResolveOptions,
) -> Result<Vec<ChannelBinding>, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let record = fetch(store, widget_key)
        .await?
        .ok_or_else(|| ResolveError::RootNotFound(widget_key.to_string()))?;
    collect_channels(&record, store, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::store_from_records;

    #[test]
    fn identical_pairs_collapse() {
        let mut plan = ChannelPlan::new();
        assert_eq!(plan.claim("ticker:BTC", "price", None), "price");
        assert_eq!(plan.claim("ticker:BTC", "price", Some("w.x")), "price");
        assert_eq!(plan.bindings().len(), 1);
    }

    #[test]
    fn same_channel_under_two_aliases_is_kept() {
        let mut plan = ChannelPlan::new();
        plan.claim("ticker:BTC", "price", None);
        plan.claim("ticker:BTC", "last", Some("w.x"));
        assert_eq!(
            plan.into_bindings(),
            vec![
                ChannelBinding::new("ticker:BTC", "price"),
                ChannelBinding::new("ticker:BTC", "last"),
            ]
        );
    }

    #[test]
    fn colliding_alias_is_scoped_then_numbered() {
        let mut plan = ChannelPlan::new();
        plan.claim("ticker:BTC", "price", None);
        assert_eq!(plan.claim("ticker:ETH", "price", Some("w.eth")), "w.eth:price");
        assert_eq!(plan.claim("ticker:SOL", "w.eth:price", None), "w.eth:price#2");
        assert_eq!(
            plan.claim("ticker:ADA", "price", Some("w.eth")),
            "w.eth:price#3"
        );
    }

    #[test]
    fn nested_self_is_never_bound_as_self() {
        let mut plan = ChannelPlan::new();
        assert_eq!(plan.claim("ticker:ETH", SELF_ALIAS, Some("w.eth")), "w.eth:self");
        assert_eq!(plan.claim("ticker:BTC", SELF_ALIAS, None), "self");
    }

    #[tokio::test]
    async fn dangling_and_cyclic_refs_contribute_nothing() {
        let store = store_from_records([
            SchemaRecord::new(
                "w.root",
                UiNode::element("panel").with_children(vec![
                    UiNode::reference("w.gone"),
                    UiNode::reference("w.root"),
                    UiNode::reference("w.leaf"),
                ]),
            )
            .with_self_channel("ticker:BTC"),
            SchemaRecord::new("w.leaf", UiNode::element("text")).with_channel_key("trades:BTC"),
        ]);

        let channels = collect_schema_channels("w.root", &store, &ResolveOptions::default())
            .await
            .expect("collection should succeed");
        assert_eq!(
            channels,
            vec![
                ChannelBinding::new("ticker:BTC", "self"),
                ChannelBinding::new("trades:BTC", "trades:BTC"),
            ]
        );
    }

    #[tokio::test]
    async fn bare_tree_has_no_root_bindings() {
        let store = store_from_records([
            SchemaRecord::new("w.a", UiNode::element("a")).with_self_channel("ticker:A")
        ]);
        let tree = UiNode::element("panel").with_children(vec![UiNode::reference("w.a")]);

        let channels = collect_tree_channels(&tree, &store, &ResolveOptions::default())
            .await
            .expect("collection should succeed");
        assert_eq!(channels, vec![ChannelBinding::new("ticker:A", "w.a:self")]);
    }
}
