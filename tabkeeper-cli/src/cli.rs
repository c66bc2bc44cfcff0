//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// `TabKeeper` command-line interface for persisted tab state
#[derive(Parser)]
#[command(name = "tabkeeper-cli")]
#[command(author, version, about = "TabKeeper command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base directory of the tab state (overrides the configured one)
    #[arg(short, long, global = true, env = "TABKEEPER_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print persisted window metadata
    #[command(about = "Print the persisted tab metadata of one or all windows")]
    Inspect {
        /// Window index; all windows when omitted
        #[arg(short, long)]
        window: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Move the legacy flat layout into the indexed state directory
    #[command(about = "Run the one-time legacy layout migration")]
    Migrate,

    /// Remove a closed window's state
    #[command(about = "Delete a closed window's metadata and the tab files only it referenced")]
    Cleanup {
        /// Index of the closed window
        #[arg(short, long)]
        window: u32,

        /// List the unreferenced tab files without deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run or replay a randomized tab model simulation
    #[command(about = "Drive the tab model with seeded random operations")]
    Simulate {
        /// Seed to replay; a random seed is drawn when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Number of steps (defaults to the configured step count)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Print the operation log
        #[arg(short, long)]
        log: bool,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completions for bash, zsh, fish, etc.")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page
    #[command(about = "Generate a man page and write it to stdout")]
    Manpage,
}

/// Output format for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON document
    Json,
}
