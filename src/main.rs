mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging; keep stdout clean for tables and JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Init => commands::handle_init(cli.db),
        Commands::Profile { action } => commands::handle_profile(action, cli.db, cli.json),
        Commands::Line { action } => commands::handle_line(action, cli.db, cli.json),
        Commands::Totals { currency, year } => {
            commands::handle_totals(currency, year, cli.db, cli.json)
        }
    }
}
