use crate::config::Settings;
use crate::support::{load_store_or_exit, print_json};
use serde_json::json;
use widgetry_kernel::extract_refs;

pub fn run(widget_key: String, settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let Some(record) = store.record(&widget_key) else {
        eprintln!("error: schema not found: {widget_key}");
        std::process::exit(1);
    };
    let refs = extract_refs(&record.tree);
    let missing: Vec<&String> = refs
        .iter()
        .chain(record.nested_schemas.iter())
        .filter(|key| store.record(key).is_none())
        .collect();

    if json_output {
        print_json(&json!({
            "action": "refs",
            "widgetKey": widget_key,
            "refs": refs,
            "nestedSchemas": record.nested_schemas,
            "missing": missing,
        }));
        return;
    }

    println!("widgetry refs {widget_key}");
    for key in &refs {
        println!("  - ref {key}");
    }
    for key in &record.nested_schemas {
        println!("  - nested {key}");
    }
    for key in missing {
        println!("  - MISSING {key}");
    }
}
