//! `TabKeeper` CLI - Command-line interface for persisted tab state
//!
//! Provides commands for inspecting window metadata, running the legacy
//! layout migration, cleaning up closed windows, and replaying randomized
//! tab model simulations.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use tabkeeper_core::LoggingSettings;
use tabkeeper_core::tracing::{TracingConfig, TracingLevel, init_tracing};
use util::GlobalArgs;

/// Logging from the `[logging]` settings; `-q` and `-v` take precedence.
fn tracing_config(logging: &LoggingSettings, verbose: u8, quiet: bool) -> TracingConfig {
    if quiet {
        TracingConfig::new().with_level(TracingLevel::Error)
    } else if verbose > 0 {
        TracingConfig::new().with_level(TracingLevel::from_verbosity(verbose))
    } else {
        TracingConfig::from_settings(logging)
    }
}

fn main() {
    let cli = Cli::parse();

    let logging = match util::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings.logging,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Warning: {e}; using default logging");
            }
            LoggingSettings::default()
        }
    };
    if let Err(e) = init_tracing(&tracing_config(&logging, cli.verbose, cli.quiet)) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let args = GlobalArgs {
        config_dir: cli.config.as_deref(),
        state_dir: cli.state_dir.as_deref(),
    };
    let result = commands::dispatch(args, cli.quiet, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
