use crate::config::Settings;
use crate::support::{load_store_or_empty_or_exit, print_json};
use serde_json::json;
use widgetry_store::read_bundle_from_path;

pub fn run(bundle_path: String, settings: Settings, json_output: bool) {
    let bundle = read_bundle_from_path(&bundle_path).unwrap_or_else(|e| {
        eprintln!("error: failed to read bundle {bundle_path}: {e}");
        std::process::exit(1);
    });

    let mut store = load_store_or_empty_or_exit(&settings.store_path);
    let imported = store.import_bundle(&bundle).unwrap_or_else(|e| {
        eprintln!("error: failed to import {bundle_path}: {e}");
        std::process::exit(1);
    });
    store.save_jsonl(&settings.store_path).unwrap_or_else(|e| {
        eprintln!(
            "error: failed to save {}: {e}",
            settings.store_path.display()
        );
        std::process::exit(1);
    });

    if json_output {
        print_json(&json!({
            "action": "import",
            "rootKey": bundle.root_key,
            "storePath": settings.store_path.display().to_string(),
            "widgetKeys": imported,
        }));
    } else {
        println!(
            "widgetry import\n  Root: {}\n  Imported: {}\n  Path: {}",
            bundle.root_key,
            imported.join(", "),
            settings.store_path.display()
        );
    }
}
