//! Deterministic schema-graph diagnostics.
//!
//! The kernel tolerates dangling references and cycles at resolution time.
//! This check surfaces them for editors and CI before a dashboard ships.

use crate::memory::MemoryStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use widgetry_kernel::extract_refs;

pub const SCHEMA_GRAPH_CHECK_KIND: &str = "widgetry.schema_graph.check.v1";

pub const FAILURE_CLASS_REF_DANGLING: &str = "schema_graph.ref.dangling";
pub const FAILURE_CLASS_ALIAS_DUPLICATE: &str = "schema_graph.alias.duplicate";
pub const WARNING_CLASS_REF_CYCLE: &str = "schema_graph.ref.cycle";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraphFinding {
    pub widget_key: String,
    pub class: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraphSummary {
    pub schema_count: usize,
    pub edge_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraphCheckReport {
    pub check_kind: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub warning_classes: Vec<String>,
    pub errors: Vec<SchemaGraphFinding>,
    pub warnings: Vec<SchemaGraphFinding>,
    pub summary: SchemaGraphSummary,
}

impl SchemaGraphCheckReport {
    pub fn accepted(&self) -> bool {
        self.result == "accepted"
    }
}

fn collect_classes(findings: &[SchemaGraphFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Outgoing edges per key: `nested_schemas` first, then tree refs.
fn dependency_edges(store: &MemoryStore) -> BTreeMap<String, Vec<String>> {
    store
        .records()
        .map(|record| {
            let mut targets = record.nested_schemas.clone();
            for widget_key in extract_refs(&record.tree) {
                if !targets.contains(&widget_key) {
                    targets.push(widget_key);
                }
            }
            (record.widget_key.clone(), targets)
        })
        .collect()
}

struct Tarjan<'a> {
    edges: &'a BTreeMap<String, Vec<String>>,
    index: usize,
    indices: BTreeMap<&'a str, usize>,
    lowlinks: BTreeMap<&'a str, usize>,
    stack: Vec<&'a str>,
    on_stack: BTreeSet<&'a str>,
    cyclic: BTreeSet<String>,
}

impl<'a> Tarjan<'a> {
    fn visit(&mut self, key: &'a str) {
        self.indices.insert(key, self.index);
        self.lowlinks.insert(key, self.index);
        self.index += 1;
        self.stack.push(key);
        self.on_stack.insert(key);

        let targets = self.edges.get(key).map(Vec::as_slice).unwrap_or_default();
        for target in targets {
            // Dangling targets have no edges of their own.
            let Some((target, _)) = self.edges.get_key_value(target.as_str()) else {
                continue;
            };
            let target = target.as_str();
            if !self.indices.contains_key(target) {
                self.visit(target);
                let low = self.lowlinks[key].min(self.lowlinks[target]);
                self.lowlinks.insert(key, low);
            } else if self.on_stack.contains(target) {
                let low = self.lowlinks[key].min(self.indices[target]);
                self.lowlinks.insert(key, low);
            }
        }

        if self.lowlinks[key] == self.indices[key] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member);
                if member == key {
                    break;
                }
            }
            let self_loop = self
                .edges
                .get(key)
                .is_some_and(|targets| targets.iter().any(|t| t == key));
            if component.len() > 1 || self_loop {
                self.cyclic
                    .extend(component.into_iter().map(str::to_string));
            }
        }
    }
}

/// Keys that participate in at least one reference cycle.
pub fn cyclic_widget_keys(store: &MemoryStore) -> BTreeSet<String> {
    let edges = dependency_edges(store);
    let mut tarjan = Tarjan {
        edges: &edges,
        index: 0,
        indices: BTreeMap::new(),
        lowlinks: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        cyclic: BTreeSet::new(),
    };
    for key in edges.keys() {
        if !tarjan.indices.contains_key(key.as_str()) {
            tarjan.visit(key);
        }
    }
    tarjan.cyclic
}

pub fn check_schema_graph(store: &MemoryStore) -> SchemaGraphCheckReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let edges = dependency_edges(store);

    for (widget_key, targets) in &edges {
        for target in targets {
            if store.record(target).is_none() {
                errors.push(SchemaGraphFinding {
                    widget_key: widget_key.clone(),
                    class: FAILURE_CLASS_REF_DANGLING.to_string(),
                    message: format!("references missing schema `{target}`"),
                });
            }
        }
    }

    for record in store.records() {
        let mut channel_by_alias: BTreeMap<String, String> = BTreeMap::new();
        for binding in record.own_bindings() {
            match channel_by_alias.get(&binding.alias) {
                Some(existing) if *existing != binding.channel_key => {
                    errors.push(SchemaGraphFinding {
                        widget_key: record.widget_key.clone(),
                        class: FAILURE_CLASS_ALIAS_DUPLICATE.to_string(),
                        message: format!(
                            "alias `{}` bound to both `{existing}` and `{}`",
                            binding.alias, binding.channel_key
                        ),
                    });
                }
                Some(_) => {}
                None => {
                    channel_by_alias.insert(binding.alias, binding.channel_key);
                }
            }
        }
    }

    for widget_key in cyclic_widget_keys(store) {
        warnings.push(SchemaGraphFinding {
            widget_key,
            class: WARNING_CLASS_REF_CYCLE.to_string(),
            message: "participates in a reference cycle; expansion stops at the repeat"
                .to_string(),
        });
    }

    let failure_classes = collect_classes(&errors);
    let warning_classes = collect_classes(&warnings);
    let summary = SchemaGraphSummary {
        schema_count: store.len(),
        edge_count: edges.values().map(Vec::len).sum(),
        error_count: errors.len(),
        warning_count: warnings.len(),
    };

    SchemaGraphCheckReport {
        check_kind: SCHEMA_GRAPH_CHECK_KIND.to_string(),
        result: if errors.is_empty() {
            "accepted".to_string()
        } else {
            "rejected".to_string()
        },
        failure_classes,
        warning_classes,
        errors,
        warnings,
        summary,
    }
}
