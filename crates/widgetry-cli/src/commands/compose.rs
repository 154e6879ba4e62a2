use crate::commands::resolve::print_tree;
use crate::config::Settings;
use crate::support::{block_on_or_exit, load_store_or_exit, print_json};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use widgetry_kernel::{build_data_context, compose_schema};

fn load_session_or_exit(path: &str) -> BTreeMap<String, Value> {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read session {path}: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error: session {path} must be a JSON object of channel values: {e}");
        std::process::exit(1);
    })
}

pub fn run(widget_key: String, settings: Settings, session: Option<String>, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let composition = block_on_or_exit(compose_schema(&widget_key, &store, &settings.options))
        .unwrap_or_else(|e| {
            eprintln!("error: failed to compose {widget_key}: {e}");
            std::process::exit(1);
        });

    let data_context = session
        .as_deref()
        .map(load_session_or_exit)
        .map(|values| Value::Object(build_data_context(&composition.channels, &values)));

    if json_output {
        print_json(&json!({
            "action": "compose",
            "widgetKey": composition.widget_key,
            "tree": composition.tree,
            "channels": composition.channels,
            "dataContext": data_context,
        }));
        return;
    }

    println!("widgetry compose {widget_key}");
    println!("  Tree:");
    print_tree(&composition.tree, 2);
    println!("  Channels:");
    for binding in &composition.channels {
        println!("    {} <- {}", binding.alias, binding.channel_key);
    }
    if let Some(Value::Object(context)) = &data_context {
        println!("  Data context:");
        for (alias, value) in context {
            println!("    {alias} = {value}");
        }
    }
}
