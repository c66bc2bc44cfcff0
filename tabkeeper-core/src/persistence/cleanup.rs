//! Cleanup of a closed window's persisted state

use std::collections::HashSet;

use tokio::task::JoinHandle;

use super::layout::StateLayout;
use super::metadata::PersistedMetadata;
use super::tab_state::TabStateStore;
use crate::error::PersistenceResult;
use crate::tab::{InstanceId, TabId};
use crate::tracing::span_names;

/// Tabs of `window` that no other window's metadata references.
///
/// A missing metadata file for `window` yields an empty list.
///
/// # Errors
///
/// Returns an error if any metadata file cannot be read. Tabs are never
/// reported as unreferenced when another window's state is unknown.
pub fn compute_instance_cleanup(
    layout: &StateLayout,
    window: InstanceId,
) -> PersistenceResult<Vec<(TabId, bool)>> {
    let own_path = layout.metadata_path(window);
    if !own_path.is_file() {
        tracing::debug!(window = %window, "No metadata for closed window");
        return Ok(Vec::new());
    }
    let own = PersistedMetadata::load_from_file(&own_path)?;

    let mut referenced = HashSet::new();
    for (other, path) in layout.list_metadata_files()? {
        if other == window {
            continue;
        }
        referenced.extend(PersistedMetadata::load_from_file(&path)?.referenced_tabs());
    }

    Ok(own
        .referenced_tabs()
        .into_iter()
        .filter(|entry| !referenced.contains(entry))
        .collect())
}

/// Deletes a closed window's metadata file on a blocking task and hands the
/// tabs only it referenced to `callback`.
///
/// The tab files themselves are left for the callback to delete.
pub fn cleanup_instance_state<F>(
    layout: StateLayout,
    window: InstanceId,
    callback: F,
) -> JoinHandle<PersistenceResult<()>>
where
    F: FnOnce(Vec<(TabId, bool)>) + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _span = tracing::info_span!(span_names::INSTANCE_CLEANUP, window = %window).entered();
        let unreferenced = compute_instance_cleanup(&layout, window)?;
        match std::fs::remove_file(layout.metadata_path(window)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(
            window = %window,
            unreferenced = unreferenced.len(),
            "Cleaned up window state"
        );
        callback(unreferenced);
        Ok(())
    })
}

/// Deletes the given tab files, logging failures; returns how many existed
pub fn delete_tab_files(store: &TabStateStore, tabs: &[(TabId, bool)]) -> usize {
    tabs.iter()
        .filter(|(id, incognito)| match store.delete(*id, *incognito) {
            Ok(existed) => existed,
            Err(e) => {
                tracing::warn!(tab_id = %id, error = %e, "Failed to delete tab file");
                false
            }
        })
        .count()
}
