//! # widgetry-store
//!
//! Memory layer for schema records.
//!
//! This crate provides:
//! - `MemoryStore` (canonical in-memory state, a kernel `SchemaStore`)
//! - JSONL read/write (portable persistence)
//! - schema-graph diagnostics (dangling refs, cycles, alias conflicts)
//! - export bundles for moving a schema and its dependencies between stores
//!
//! ## Data model
//!
//! ```text
//! JSONL (on disk, one line per schema record)
//!     ↕  load / save
//! MemoryStore ──lookup──▶ widgetry-kernel
//!     ↕  export / import
//! ExportBundle (root + dependencies, digest-checked)
//! ```

pub mod bundle;
pub mod jsonl;
pub mod memory;
pub mod schema_graph;

pub use bundle::{
    BundleError, EXPORT_BUNDLE_KIND, EXPORT_BUNDLE_SCHEMA, ExportBundle, export_bundle,
    read_bundle_from_path, records_digest, write_bundle_to_path,
};
pub use jsonl::{
    JsonlError, read_records, read_records_from_path, write_records, write_records_to_path,
};
pub use memory::{MemoryStore, MemoryStoreError};
pub use schema_graph::{
    FAILURE_CLASS_ALIAS_DUPLICATE, FAILURE_CLASS_REF_DANGLING, SCHEMA_GRAPH_CHECK_KIND,
    SchemaGraphCheckReport, SchemaGraphFinding, SchemaGraphSummary, WARNING_CLASS_REF_CYCLE,
    check_schema_graph, cyclic_widget_keys,
};
