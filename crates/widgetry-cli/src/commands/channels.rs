use crate::config::Settings;
use crate::support::{block_on_or_exit, load_store_or_exit, print_json};
use serde_json::json;
use widgetry_kernel::collect_schema_channels;

pub fn run(widget_key: String, settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let channels = block_on_or_exit(collect_schema_channels(
        &widget_key,
        &store,
        &settings.options,
    ))
    .unwrap_or_else(|e| {
        eprintln!("error: failed to collect channels for {widget_key}: {e}");
        std::process::exit(1);
    });

    if json_output {
        print_json(&json!({
            "action": "channels",
            "widgetKey": widget_key,
            "maxDepth": settings.options.max_depth,
            "channels": channels,
        }));
        return;
    }

    println!("widgetry channels {widget_key}");
    for binding in &channels {
        println!("  {} <- {}", binding.alias, binding.channel_key);
    }
}
