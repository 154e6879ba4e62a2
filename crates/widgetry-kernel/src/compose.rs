//! Composition: resolve a schema and collect its channels in one call.
//!
//! Editors re-compose on every keystroke; [`LiveComposer`] applies a
//! latest-request-wins guard so a slow, stale composition is discarded
//! once a newer one has started.

use crate::channels::collect_channels;
use crate::error::ResolveError;
use crate::node::UiNode;
use crate::record::{ChannelBinding, SchemaRecord};
use crate::resolve::{ResolveOptions, resolve_record};
use crate::store::{SchemaStore, fetch};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A fully resolved tree and the bindings it needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub widget_key: String,
    pub tree: UiNode,
    pub channels: Vec<ChannelBinding>,
}

pub async fn compose_record<S>(
    record: &SchemaRecord,
    store: &S,
    options: &ResolveOptions,
) -> Result<Composition, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let tree = resolve_record(record, store, options).await?;
    let channels = collect_channels(record, store, options).await?;
    Ok(Composition {
        widget_key: record.widget_key.clone(),
        tree,
        channels,
    })
}

pub async fn compose_schema<S>(
    widget_key: &str,
    store: &S,
    options: &ResolveOptions,
) -> Result<Composition, ResolveError>
where
    S: SchemaStore + ?Sized,
{
    let record = fetch(store, widget_key)
        .await?
        .ok_or_else(|| ResolveError::RootNotFound(widget_key.to_string()))?;
    compose_record(&record, store, options).await
}

/// Identifies one request issued by a [`RequestGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic request counter; only the most recent token is current.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier token.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Composes records against one store, discarding superseded results.
#[derive(Debug)]
pub struct LiveComposer<S> {
    store: S,
    options: ResolveOptions,
    guard: RequestGuard,
}

impl<S: SchemaStore> LiveComposer<S> {
    pub fn new(store: S, options: ResolveOptions) -> Self {
        Self {
            store,
            options,
            guard: RequestGuard::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compose `record`; `Ok(None)` if a newer compose began meanwhile.
    pub async fn compose(
        &self,
        record: &SchemaRecord,
    ) -> Result<Option<Composition>, ResolveError> {
        let token = self.guard.begin();
        let composition = compose_record(record, &self.store, &self.options).await?;
        if !self.guard.is_current(token) {
            debug!(
                widget_key = %record.widget_key,
                token = token.value(),
                "discarding stale composition"
            );
            return Ok(None);
        }
        Ok(Some(composition))
    }
}
