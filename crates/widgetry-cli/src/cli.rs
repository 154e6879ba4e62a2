use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "widgetry",
    about = "Widgetry: compose dashboard schemas and resolve their data channels",
    version
)]
pub struct Cli {
    /// Path to a config TOML (default: .widgetry/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stored schema widget keys
    List {
        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the widget keys one schema references directly
    Refs {
        /// Widget key of the schema to inspect
        widget_key: String,

        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a schema into one concrete tree
    Resolve {
        /// Widget key of the root schema
        widget_key: String,

        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Tree levels past which references stay unexpanded
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect the alias-safe channel bindings a composed schema needs
    Channels {
        /// Widget key of the root schema
        widget_key: String,

        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Tree levels past which references stay unexpanded
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve and collect channels together
    Compose {
        /// Widget key of the root schema
        widget_key: String,

        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Tree levels past which references stay unexpanded
        #[arg(long)]
        max_depth: Option<usize>,

        /// Optional JSON object of channel values used to build a data context
        #[arg(long)]
        session: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Package a schema and every record it depends on into a bundle
    Export {
        /// Widget key of the root schema
        widget_key: String,

        /// Bundle output path
        #[arg(long)]
        out: String,

        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a bundle's records into the store (upsert)
    Import {
        /// Bundle path
        bundle: String,

        /// Path to the schema store JSONL (created if missing)
        #[arg(long)]
        store: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the stored schema graph for dangling refs, cycles and alias conflicts
    Check {
        /// Path to the schema store JSONL
        #[arg(long)]
        store: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
