//! Flat data context for rendering a composed tree.

use crate::record::ChannelBinding;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Bind each alias to the session-cache value of its channel.
///
/// Channels the transport has not populated yet are bound to `null`.
pub fn build_data_context(
    bindings: &[ChannelBinding],
    session: &BTreeMap<String, Value>,
) -> Map<String, Value> {
    bindings
        .iter()
        .map(|binding| {
            let value = session
                .get(&binding.channel_key)
                .cloned()
                .unwrap_or(Value::Null);
            (binding.alias.clone(), value)
        })
        .collect()
}
