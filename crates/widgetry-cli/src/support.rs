use crate::config::Config;
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use widgetry_store::MemoryStore;

pub const LOG_ENV_VAR: &str = "WIDGETRY_LOG";

/// Engine diagnostics go to stderr; stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn load_config_or_exit(path: Option<&str>) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_store_or_exit(path: &Path) -> MemoryStore {
    if !path.exists() {
        eprintln!("error: schema store not found: {}", path.display());
        std::process::exit(1);
    }
    MemoryStore::load_jsonl(path).unwrap_or_else(|e| {
        eprintln!("error: failed to load {}: {e}", path.display());
        std::process::exit(1);
    })
}

/// Load the store, or start empty when the file does not exist yet.
pub fn load_store_or_empty_or_exit(path: &Path) -> MemoryStore {
    if !path.exists() {
        return MemoryStore::default();
    }
    load_store_or_exit(path)
}

pub fn block_on_or_exit<F: Future>(future: F) -> F::Output {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        });
    runtime.block_on(future)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("error: failed to render json: {e}");
        std::process::exit(1);
    });
    println!("{rendered}");
}
