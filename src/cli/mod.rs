use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "costbook")]
#[command(version, about = "Personal-finance cost-basis ledger")]
#[command(
    long_about = "Track buy/sell/opening-balance events per asset with a running \
acquisition cost, holdings quantity, and realized gain under weighted-average \
or FIFO accounting."
)]
pub struct Cli {
    /// Database file (defaults to ~/.costbook/data.db)
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Ledger profile management
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Ledger line management
    Line {
        #[command(subcommand)]
        action: LineCommands,
    },

    /// Monthly and yearly totals across profiles of one currency
    Totals {
        /// Only include profiles with this currency
        #[arg(long)]
        currency: Option<String>,

        /// Restrict the report to a single year
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create a new ledger profile
    Create {
        /// Profile name (e.g. the broker or account)
        #[arg(long)]
        name: String,

        /// Tracked asset name (e.g. a ticker)
        #[arg(long)]
        asset: String,

        /// Currency code of the profile's amounts
        #[arg(long)]
        currency: String,

        /// Display decimal places
        #[arg(long, default_value_t = 2)]
        precision: u32,

        /// Accounting method: average or fifo
        #[arg(long, default_value = "average")]
        method: String,
    },

    /// List all profiles
    List,

    /// Show one profile with its lines
    Show { profile_id: i64 },

    /// Rename a profile
    Rename { profile_id: i64, name: String },

    /// Change the tracked asset and display precision
    SetAsset {
        profile_id: i64,
        asset: String,

        #[arg(long, default_value_t = 2)]
        precision: u32,
    },

    /// Switch the accounting method and recompute every line
    SetMethod { profile_id: i64, method: String },

    /// Show or hide a profile in listings
    SetVisible { profile_id: i64, visible: bool },

    /// Set or clear the profile icon
    SetIcon {
        profile_id: i64,
        icon: Option<String>,
    },

    /// Delete a profile and all of its lines
    Delete { profile_id: i64 },
}

#[derive(Subcommand)]
pub enum LineCommands {
    /// Add a line to a profile
    Add {
        profile_id: i64,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Line type: buy, sell, or setup
        #[arg(long = "type")]
        line_type: String,

        /// Units bought/sold (must be positive)
        #[arg(long)]
        quantity: String,

        /// Total amount paid or received for the whole line
        #[arg(long)]
        amount: String,

        /// Position in the sequence (defaults to the end)
        #[arg(long = "at")]
        display_order: Option<usize>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Remove a line
    Remove { profile_id: i64, line_id: i64 },

    /// Move a line one position earlier
    MoveUp { profile_id: i64, line_id: i64 },

    /// Move a line one position later
    MoveDown { profile_id: i64, line_id: i64 },

    /// Replace a line's inputs (keeps its position, assigns a new id)
    Edit {
        profile_id: i64,
        line_id: i64,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Line type: buy, sell, or setup
        #[arg(long = "type")]
        line_type: String,

        #[arg(long)]
        quantity: String,

        #[arg(long)]
        amount: String,

        #[arg(long)]
        comment: Option<String>,
    },
}
