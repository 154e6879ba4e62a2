use crate::config::Settings;
use crate::support::{load_store_or_exit, print_json};
use serde_json::json;

pub fn run(settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);

    if json_output {
        print_json(&json!({
            "action": "list",
            "storePath": settings.store_path.display().to_string(),
            "count": store.len(),
            "widgetKeys": store.widget_keys(),
        }));
        return;
    }

    println!("widgetry list");
    println!("  Store: {}", settings.store_path.display());
    println!("  Schemas: {}", store.len());
    for record in store.records() {
        println!(
            "  - {} (channels={}, nested={})",
            record.widget_key,
            record.own_bindings().len(),
            record.nested_schemas.len()
        );
    }
}
