//! Canonical in-memory representation of schema records.
//!
//! This is the memory boundary for `widgetry-store`:
//! - load/store JSONL
//! - expose deterministic keyed queries
//! - serve the kernel's `SchemaStore` lookups from snapshots

use crate::jsonl::{JsonlError, read_records_from_path, write_records_to_path};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use widgetry_kernel::{SchemaRecord, SchemaStore, StoreError};

/// Errors raised while loading or mutating the memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("widget key must not be empty")]
    EmptyWidgetKey,
}

/// Canonical in-memory state for schema records, keyed by widget key.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, SchemaRecord>,
}

impl MemoryStore {
    /// Build a store from fully-materialized records.
    ///
    /// Duplicate keys are resolved with deterministic last-write-wins
    /// semantics. JSONL files are stricter: a repeated key fails the load.
    pub fn from_records(records: Vec<SchemaRecord>) -> Result<Self, MemoryStoreError> {
        let mut index = BTreeMap::new();
        for record in records {
            if record.widget_key.trim().is_empty() {
                return Err(MemoryStoreError::EmptyWidgetKey);
            }
            index.insert(record.widget_key.clone(), record);
        }
        Ok(Self { records: index })
    }

    /// Load store state from a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, MemoryStoreError> {
        let records = read_records_from_path(path)?;
        Self::from_records(records)
    }

    /// Persist store state to a JSONL file.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), MemoryStoreError> {
        let records: Vec<SchemaRecord> = self.records.values().cloned().collect();
        write_records_to_path(path, &records)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lookup one record by widget key.
    pub fn record(&self, widget_key: &str) -> Option<&SchemaRecord> {
        self.records.get(widget_key)
    }

    /// Insert or replace a record by widget key.
    ///
    /// Returns the previous value if present.
    pub fn upsert_record(
        &mut self,
        record: SchemaRecord,
    ) -> Result<Option<SchemaRecord>, MemoryStoreError> {
        if record.widget_key.trim().is_empty() {
            return Err(MemoryStoreError::EmptyWidgetKey);
        }
        Ok(self.records.insert(record.widget_key.clone(), record))
    }

    pub fn remove_record(&mut self, widget_key: &str) -> Result<SchemaRecord, MemoryStoreError> {
        self.records
            .remove(widget_key)
            .ok_or_else(|| MemoryStoreError::SchemaNotFound(widget_key.to_string()))
    }

    /// Iterate all records in deterministic key order.
    pub fn records(&self) -> impl Iterator<Item = &SchemaRecord> {
        self.records.values()
    }

    pub fn widget_keys(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn lookup(&self, widget_key: &str) -> Result<Option<SchemaRecord>, StoreError> {
        Ok(self.records.get(widget_key).cloned())
    }
}
