//! # Widgetry Kernel
//!
//! Schema composition and channel resolution for declarative dashboards.
//!
//! A dashboard is a tree of UI nodes. Some nodes are references that stand
//! in for other stored schemas, which may reference further schemas, and so
//! on, cycles included. The kernel expands those references into one
//! concrete tree and computes the alias-safe list of live data channels the
//! composed tree needs. It never fetches data, renders, or persists.
//!
//! ## Architecture
//!
//! ```text
//! SchemaStore            ← keyed async lookup (external collaborator)
//!     │
//! extract_refs           ← refs literally present in one tree
//!     │
//! resolve                ← tree expansion, path-local cycle check, depth bound
//! collect_channels       ← same walk, pre-order alias-safe binding merge
//!     │
//! collect_for_export     ← whole-graph visited set, distinct records
//!     │
//! compose / LiveComposer ← resolve + collect, latest request wins
//! ```

pub mod channels;
pub mod compose;
pub mod context;
pub mod error;
pub mod export;
pub mod node;
pub mod record;
pub mod refs;
pub mod resolve;
pub mod store;

pub use channels::{
    ChannelPlan, collect_channels, collect_schema_channels, collect_tree_channels,
};
pub use compose::{
    Composition, LiveComposer, RequestGuard, RequestToken, compose_record, compose_schema,
};
pub use context::build_data_context;
pub use error::{ResolveError, StoreError};
pub use export::collect_for_export;
pub use node::{
    PLACEHOLDER_KIND, PLACEHOLDER_REASON_PROP, PLACEHOLDER_REF_PROP, PlaceholderReason, UiElement,
    UiNode,
};
pub use record::{ChannelAlias, ChannelBinding, SELF_ALIAS, SchemaRecord};
pub use refs::extract_refs;
pub use resolve::{
    DEFAULT_MAX_DEPTH, ResolveOptions, resolve, resolve_record, resolve_schema, resolve_tree,
};
pub use store::{SchemaStore, store_from_records};
