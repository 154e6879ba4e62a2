//! Export bundles: a schema and every record it depends on, packaged for
//! transfer or backup.

use crate::jsonl::{JsonlError, io_error, validate_payload_bytes, write_atomically};
use crate::memory::{MemoryStore, MemoryStoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;
use widgetry_kernel::{ResolveError, SchemaRecord, collect_for_export};

pub const EXPORT_BUNDLE_SCHEMA: u32 = 1;
pub const EXPORT_BUNDLE_KIND: &str = "widgetry.export_bundle.v1";
const BUNDLE_DIGEST_PREFIX: &str = "eb1_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub schema: u32,
    pub bundle_kind: String,
    pub root_key: String,
    pub exported_at: DateTime<Utc>,
    pub digest: String,
    /// Root first, then dependencies in discovery order.
    pub records: Vec<SchemaRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error(transparent)]
    Store(#[from] MemoryStoreError),

    #[error("root schema not found: {0}")]
    RootNotFound(String),

    #[error("bundle parse error: {0}")]
    Parse(String),

    #[error("unsupported bundle: schema={schema} kind={kind}")]
    Unsupported { schema: u32, kind: String },

    #[error("bundle digest mismatch: expected {expected}, computed {actual}")]
    DigestMismatch { expected: String, actual: String },
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut digest = Sha256::new();
    digest.update(bytes);
    let output = digest.finalize();
    let mut rendered = String::with_capacity(BUNDLE_DIGEST_PREFIX.len() + output.len() * 2);
    rendered.push_str(BUNDLE_DIGEST_PREFIX);
    for byte in output {
        rendered.push_str(format!("{byte:02x}").as_str());
    }
    rendered
}

/// Content digest over the records' canonical JSON.
pub fn records_digest(records: &[SchemaRecord]) -> String {
    digest_bytes(serde_json::to_vec(records).unwrap_or_default().as_slice())
}

impl ExportBundle {
    pub fn new(root_key: impl Into<String>, records: Vec<SchemaRecord>) -> Self {
        Self {
            schema: EXPORT_BUNDLE_SCHEMA,
            bundle_kind: EXPORT_BUNDLE_KIND.to_string(),
            root_key: root_key.into(),
            exported_at: Utc::now(),
            digest: records_digest(&records),
            records,
        }
    }

    /// Check schema, kind and that the digest still matches the records.
    pub fn verify(&self) -> Result<(), BundleError> {
        if self.schema != EXPORT_BUNDLE_SCHEMA || self.bundle_kind != EXPORT_BUNDLE_KIND {
            return Err(BundleError::Unsupported {
                schema: self.schema,
                kind: self.bundle_kind.clone(),
            });
        }
        let actual = records_digest(&self.records);
        if actual != self.digest {
            return Err(BundleError::DigestMismatch {
                expected: self.digest.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Package `root_key` and everything reachable from it.
pub async fn export_bundle(
    store: &MemoryStore,
    root_key: &str,
) -> Result<ExportBundle, BundleError> {
    let mut visited = BTreeSet::new();
    let records = collect_for_export(root_key, store, &mut visited).await?;
    if records.is_empty() {
        return Err(BundleError::RootNotFound(root_key.to_string()));
    }
    info!(root_key, records = records.len(), "exported schema bundle");
    Ok(ExportBundle::new(root_key, records))
}

pub fn write_bundle_to_path(
    path: impl AsRef<Path>,
    bundle: &ExportBundle,
) -> Result<(), BundleError> {
    write_atomically(path.as_ref(), |writer| {
        serde_json::to_writer_pretty(&mut *writer, bundle)
            .map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writer.write_all(b"\n").map_err(JsonlError::Write)
    })?;
    Ok(())
}

/// Read and verify a bundle file.
pub fn read_bundle_from_path(path: impl AsRef<Path>) -> Result<ExportBundle, BundleError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error(path))?;
    validate_payload_bytes(path, &bytes)?;
    let bundle: ExportBundle = serde_json::from_slice(&bytes)
        .map_err(|e| BundleError::Parse(format!("{}: {e}", path.display())))?;
    bundle.verify()?;
    Ok(bundle)
}

impl MemoryStore {
    /// Upsert every record of a verified bundle. Returns the imported keys.
    pub fn import_bundle(&mut self, bundle: &ExportBundle) -> Result<Vec<String>, BundleError> {
        bundle.verify()?;
        // Stage into a copy so a rejected record leaves `self` untouched.
        let mut staged = self.clone();
        let mut imported = Vec::with_capacity(bundle.records.len());
        for record in &bundle.records {
            imported.push(record.widget_key.clone());
            staged.upsert_record(record.clone())?;
        }
        *self = staged;
        info!(root_key = %bundle.root_key, records = imported.len(), "imported schema bundle");
        Ok(imported)
    }
}
