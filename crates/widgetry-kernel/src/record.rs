//! Schema records and channel bindings.

use crate::node::UiNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reserved alias for the primary data subject of the outermost schema.
pub const SELF_ALIAS: &str = "self";

/// A stored, named UI description and its data dependencies.
///
/// Records are immutable snapshots for the duration of one resolution;
/// the engine never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRecord {
    pub widget_key: String,
    pub tree: UiNode,
    /// Legacy/simple form: channels bound under their own key.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_aliases: Vec<ChannelAlias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_channel_key: Option<String>,
    /// Keys this schema depends on even when the tree does not name them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_schemas: Vec<String>,
}

/// A declared binding preference. A missing alias means the channel key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAlias {
    pub channel_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ChannelAlias {
    pub fn effective_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.channel_key)
    }
}

/// One channel exposed under one local name in a composed data context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBinding {
    pub channel_key: String,
    pub alias: String,
}

impl ChannelBinding {
    pub fn new(channel_key: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            channel_key: channel_key.into(),
            alias: alias.into(),
        }
    }
}

impl SchemaRecord {
    pub fn new(widget_key: impl Into<String>, tree: UiNode) -> Self {
        Self {
            widget_key: widget_key.into(),
            tree,
            channel_keys: Vec::new(),
            channel_aliases: Vec::new(),
            self_channel_key: None,
            nested_schemas: Vec::new(),
        }
    }

    pub fn with_channel_key(mut self, channel_key: impl Into<String>) -> Self {
        self.channel_keys.push(channel_key.into());
        self
    }

    pub fn with_alias(mut self, channel_key: impl Into<String>, alias: impl Into<String>) -> Self {
        self.channel_aliases.push(ChannelAlias {
            channel_key: channel_key.into(),
            alias: Some(alias.into()),
        });
        self
    }

    pub fn with_self_channel(mut self, channel_key: impl Into<String>) -> Self {
        self.self_channel_key = Some(channel_key.into());
        self
    }

    pub fn with_nested(mut self, widget_key: impl Into<String>) -> Self {
        self.nested_schemas.push(widget_key.into());
        self
    }

    /// The bindings this record declares directly, before any merging.
    ///
    /// Order: the self binding, then `channel_aliases`, then each
    /// `channel_keys` entry no alias entry already covers.
    ///
    /// A channel listed in both places is bound only under its declared
    /// alias; the bare-key alias `{k, k}` is intentionally not exposed.
    pub fn own_bindings(&self) -> Vec<ChannelBinding> {
        let mut bindings = Vec::new();
        if let Some(channel_key) = &self.self_channel_key {
            bindings.push(ChannelBinding::new(channel_key, SELF_ALIAS));
        }

        let mut aliased = BTreeSet::new();
        for entry in &self.channel_aliases {
            aliased.insert(entry.channel_key.as_str());
            bindings.push(ChannelBinding::new(
                &entry.channel_key,
                entry.effective_alias(),
            ));
        }

        for channel_key in &self.channel_keys {
            if !aliased.contains(channel_key.as_str()) {
                bindings.push(ChannelBinding::new(channel_key, channel_key));
            }
        }
        bindings
    }
}
