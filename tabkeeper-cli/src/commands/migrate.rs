//! Legacy layout migration command.

use tabkeeper_core::persistence::{LegacyLayoutMigration, MigrationOutcome};

use crate::error::CliError;
use crate::util::{GlobalArgs, resolve_layout};

/// Migrate command handler
pub fn cmd_migrate(args: GlobalArgs<'_>) -> Result<(), CliError> {
    let layout = resolve_layout(args)?;
    let base_dir = layout.base_dir().display().to_string();
    let outcome = LegacyLayoutMigration::new(layout).run()?;
    println!("{}", describe_outcome(outcome, &base_dir));

    if let MigrationOutcome::Migrated { failed, .. } = outcome
        && failed > 0
    {
        return Err(CliError::Migration(format!(
            "{failed} file(s) could not be moved; run again to retry"
        )));
    }
    Ok(())
}

/// Human-readable summary of a migration run
#[must_use]
pub fn describe_outcome(outcome: MigrationOutcome, base_dir: &str) -> String {
    match outcome {
        MigrationOutcome::AlreadyMigrated => format!("Already migrated: {base_dir}"),
        MigrationOutcome::SkippedDestinationNotEmpty => {
            format!("Skipped: state directory under {base_dir} already has files")
        }
        MigrationOutcome::NothingToMigrate => format!("No legacy tab state in {base_dir}"),
        MigrationOutcome::Migrated { moved, failed } => {
            format!("Migrated {moved} file(s) in {base_dir} ({failed} failed)")
        }
    }
}
