use crate::config::Settings;
use crate::support::{block_on_or_exit, load_store_or_exit, print_json};
use serde_json::json;
use widgetry_kernel::{
    PLACEHOLDER_KIND, PLACEHOLDER_REASON_PROP, PLACEHOLDER_REF_PROP, UiElement, UiNode,
    resolve_schema,
};

fn text_prop<'a>(element: &'a UiElement, name: &str) -> &'a str {
    element
        .props
        .get(name)
        .and_then(|value| value.as_str())
        .unwrap_or("?")
}

/// One line per node, children indented under their parent.
pub fn print_tree(node: &UiNode, indent: usize) {
    let pad = "  ".repeat(indent);
    let Some(element) = node.as_element() else {
        println!("{pad}{}", json!(node));
        return;
    };
    let kind = element.kind.as_deref().unwrap_or("(no kind)");
    if let Some(widget_key) = node.schema_ref() {
        println!("{pad}{kind} -> {widget_key} (unexpanded)");
    } else if node.is_placeholder() {
        println!(
            "{pad}{PLACEHOLDER_KIND} {} ({})",
            text_prop(element, PLACEHOLDER_REF_PROP),
            text_prop(element, PLACEHOLDER_REASON_PROP)
        );
    } else {
        println!("{pad}{kind}");
    }
    for child in node.children() {
        print_tree(child, indent + 1);
    }
}

pub fn run(widget_key: String, settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let tree = block_on_or_exit(resolve_schema(&widget_key, &store, &settings.options))
        .unwrap_or_else(|e| {
            eprintln!("error: failed to resolve {widget_key}: {e}");
            std::process::exit(1);
        });

    if json_output {
        print_json(&json!({
            "action": "resolve",
            "widgetKey": widget_key,
            "maxDepth": settings.options.max_depth,
            "tree": tree,
        }));
        return;
    }

    println!("widgetry resolve {widget_key}");
    print_tree(&tree, 1);
}
