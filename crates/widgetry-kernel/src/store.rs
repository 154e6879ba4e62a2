//! The schema record store seam.
//!
//! Storage is an external collaborator: the engine only needs a keyed,
//! possibly asynchronous lookup. Implementations must hand out snapshots;
//! the engine never writes back.

use crate::error::{ResolveError, StoreError};
use crate::record::SchemaRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Return the record stored under `widget_key`, or `None` if absent.
    async fn lookup(&self, widget_key: &str) -> Result<Option<SchemaRecord>, StoreError>;
}

#[async_trait]
impl SchemaStore for BTreeMap<String, SchemaRecord> {
    async fn lookup(&self, widget_key: &str) -> Result<Option<SchemaRecord>, StoreError> {
        Ok(self.get(widget_key).cloned())
    }
}

#[async_trait]
impl<S: SchemaStore + ?Sized> SchemaStore for &S {
    async fn lookup(&self, widget_key: &str) -> Result<Option<SchemaRecord>, StoreError> {
        (**self).lookup(widget_key).await
    }
}

#[async_trait]
impl<S: SchemaStore + ?Sized> SchemaStore for Arc<S> {
    async fn lookup(&self, widget_key: &str) -> Result<Option<SchemaRecord>, StoreError> {
        (**self).lookup(widget_key).await
    }
}

/// Lookup with the widget key attached to any transport failure.
pub(crate) async fn fetch<S: SchemaStore + ?Sized>(
    store: &S,
    widget_key: &str,
) -> Result<Option<SchemaRecord>, ResolveError> {
    store
        .lookup(widget_key)
        .await
        .map_err(|e| ResolveError::store(widget_key, e))
}

/// Build an in-process store from records, keyed by their widget keys.
pub fn store_from_records(
    records: impl IntoIterator<Item = SchemaRecord>,
) -> BTreeMap<String, SchemaRecord> {
    records
        .into_iter()
        .map(|record| (record.widget_key.clone(), record))
        .collect()
}
