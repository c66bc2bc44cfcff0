//! Closed window cleanup command.

use tabkeeper_core::persistence::{
    StateLayout, TabStateStore, cleanup_instance_state, compute_instance_cleanup,
    delete_tab_files,
};
use tabkeeper_core::{InstanceId, TabId};

use crate::error::CliError;
use crate::util::{GlobalArgs, resolve_layout, runtime};

/// Cleanup command handler
pub fn cmd_cleanup(args: GlobalArgs<'_>, window: u32, dry_run: bool) -> Result<(), CliError> {
    let layout = resolve_layout(args)?;
    let instance = InstanceId::new(window);
    if !layout.metadata_path(instance).is_file() {
        return Err(CliError::WindowNotFound(window));
    }

    if dry_run {
        let unreferenced = compute_instance_cleanup(&layout, instance)?;
        println!("{}", format_tabs(&unreferenced));
        println!(
            "Would delete metadata for window {window} and {} tab file(s)",
            unreferenced.len()
        );
        return Ok(());
    }

    let unreferenced = run_cleanup(layout.clone(), instance)?;
    let deleted = delete_tab_files(&TabStateStore::new(layout), &unreferenced);
    println!("{}", format_tabs(&unreferenced));
    println!("Deleted metadata for window {window} and {deleted} tab file(s)");
    Ok(())
}

fn run_cleanup(layout: StateLayout, window: InstanceId) -> Result<Vec<(TabId, bool)>, CliError> {
    runtime()?.block_on(async move {
        let (tx, rx) = tokio::sync::oneshot::channel();
        cleanup_instance_state(layout, window, move |tabs| {
            let _ = tx.send(tabs);
        })
        .await
        .map_err(|e| CliError::State(format!("Cleanup task failed: {e}")))??;
        let tabs = rx
            .await
            .map_err(|_| CliError::State("Cleanup finished without a result".into()))?;
        Ok::<_, CliError>(tabs)
    })
}

/// One line per unreferenced tab file
#[must_use]
pub fn format_tabs(tabs: &[(TabId, bool)]) -> String {
    if tabs.is_empty() {
        return "No unreferenced tab files.".to_string();
    }
    tabs.iter()
        .map(|(id, incognito)| {
            let mode = if *incognito { "incognito" } else { "regular" };
            format!("{:<6}  {mode}", id.get())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
