//! Command handler modules for the CLI.

mod cleanup;
mod completions;
mod inspect;
mod manpage;
mod migrate;
mod simulate;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::GlobalArgs;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(args: GlobalArgs<'_>, quiet: bool, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Inspect { window, format } => inspect::cmd_inspect(args, window, format),
        Commands::Migrate => migrate::cmd_migrate(args),
        Commands::Cleanup { window, dry_run } => cleanup::cmd_cleanup(args, window, dry_run),
        Commands::Simulate { seed, steps, log } => {
            simulate::cmd_simulate(args, simulate::SimulateParams { seed, steps, log, quiet })
        }
        Commands::Completions { shell } => completions::cmd_completions(shell),
        Commands::Manpage => manpage::cmd_manpage(),
    }
}
