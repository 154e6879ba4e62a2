//! Error types for widgetry kernel operations.
//!
//! Dangling references, cycles, depth cut-offs and malformed nodes are
//! absorbed by the engine and never surface here. Only a failing store
//! lookup (or a missing root for keyed entry points) propagates.

/// Transport-level failure of a schema store lookup.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing storage returned data that is not a schema record.
    #[error("corrupted store record: {0}")]
    Corrupt(String),
}

/// Errors raised by the resolution entry points.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("lookup of `{widget_key}` failed: {source}")]
    Store {
        widget_key: String,
        #[source]
        source: StoreError,
    },

    /// A keyed entry point was asked to start from a key the store lacks.
    #[error("root schema not found: {0}")]
    RootNotFound(String),
}

impl ResolveError {
    pub(crate) fn store(widget_key: &str, source: StoreError) -> Self {
        ResolveError::Store {
            widget_key: widget_key.to_string(),
            source,
        }
    }
}
