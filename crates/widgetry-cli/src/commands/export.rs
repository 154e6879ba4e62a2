use crate::config::Settings;
use crate::support::{block_on_or_exit, load_store_or_exit, print_json};
use serde_json::json;
use widgetry_store::{export_bundle, write_bundle_to_path};

pub fn run(widget_key: String, out: String, settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let bundle = block_on_or_exit(export_bundle(&store, &widget_key)).unwrap_or_else(|e| {
        eprintln!("error: failed to export {widget_key}: {e}");
        std::process::exit(1);
    });
    write_bundle_to_path(&out, &bundle).unwrap_or_else(|e| {
        eprintln!("error: failed to write {out}: {e}");
        std::process::exit(1);
    });

    let keys: Vec<&str> = bundle
        .records
        .iter()
        .map(|record| record.widget_key.as_str())
        .collect();

    if json_output {
        print_json(&json!({
            "action": "export",
            "rootKey": bundle.root_key,
            "bundlePath": out,
            "digest": bundle.digest,
            "widgetKeys": keys,
        }));
    } else {
        println!(
            "widgetry export\n  Root: {}\n  Records: {}\n  Digest: {}\n  Path: {}",
            bundle.root_key,
            keys.join(", "),
            bundle.digest,
            out
        );
    }
}
