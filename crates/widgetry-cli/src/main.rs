//! Widgetry CLI: the `widgetry` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing();
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::List { store, json } => commands::list::run(config.settings(store, None), json),

        Commands::Refs {
            widget_key,
            store,
            json,
        } => commands::refs::run(widget_key, config.settings(store, None), json),

        Commands::Resolve {
            widget_key,
            store,
            max_depth,
            json,
        } => commands::resolve::run(widget_key, config.settings(store, max_depth), json),

        Commands::Channels {
            widget_key,
            store,
            max_depth,
            json,
        } => commands::channels::run(widget_key, config.settings(store, max_depth), json),

        Commands::Compose {
            widget_key,
            store,
            max_depth,
            session,
            json,
        } => {
            let settings = config.settings(store, max_depth);
            commands::compose::run(widget_key, settings, session, json)
        }

        Commands::Export {
            widget_key,
            out,
            store,
            json,
        } => commands::export::run(widget_key, out, config.settings(store, None), json),

        Commands::Import {
            bundle,
            store,
            json,
        } => commands::import::run(bundle, config.settings(store, None), json),

        Commands::Check { store, json } => commands::check::run(config.settings(store, None), json),
    }
}
