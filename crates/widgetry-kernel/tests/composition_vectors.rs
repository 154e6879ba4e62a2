//! Integration tests: run the composition vectors under tests/fixtures/.
//!
//! Each fixture directory has:
//! - case.json: the stored records, the root key, an optional maxDepth
//! - expect.json: the resolved tree, collected channels and export order
//!
//! Every vector is checked through the keyed entry points, so the root's own
//! key is on the active path.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use widgetry_kernel::{
    ResolveOptions, SchemaRecord, collect_for_export, collect_schema_channels, resolve_schema,
    store_from_records,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Case {
    root: String,
    #[serde(default)]
    max_depth: Option<usize>,
    records: Vec<SchemaRecord>,
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &PathBuf) -> Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

async fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case: Case = serde_json::from_value(read_json(&dir.join("case.json")))
        .unwrap_or_else(|e| panic!("malformed case for {name}: {e}"));
    let expected = read_json(&dir.join("expect.json"));

    let options = case
        .max_depth
        .map(ResolveOptions::with_max_depth)
        .unwrap_or_default();
    let store = store_from_records(case.records);

    let tree = resolve_schema(&case.root, &store, &options)
        .await
        .expect("resolution should succeed");
    let channels = collect_schema_channels(&case.root, &store, &options)
        .await
        .expect("channel collection should succeed");
    let mut visited = BTreeSet::new();
    let exported: Vec<String> = collect_for_export(&case.root, &store, &mut visited)
        .await
        .expect("export should succeed")
        .into_iter()
        .map(|record| record.widget_key)
        .collect();

    let actual = serde_json::json!({
        "tree": tree,
        "channels": channels,
        "export": exported,
    });

    assert_eq!(
        actual,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&actual).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[tokio::test]
async fn cycle_a_b_a() {
    run_fixture("cycle_a_b_a").await;
}

#[tokio::test]
async fn nested_self_alias() {
    run_fixture("nested_self_alias").await;
}

#[tokio::test]
async fn document_order() {
    run_fixture("document_order").await;
}

#[tokio::test]
async fn dangling_ref() {
    run_fixture("dangling_ref").await;
}

#[tokio::test]
async fn export_completeness() {
    run_fixture("export_completeness").await;
}
