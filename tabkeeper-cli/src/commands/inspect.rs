//! Inspect persisted window metadata command.

use std::fmt::Write as _;

use tabkeeper_core::{InstanceId, TabGroupId};
use tabkeeper_core::persistence::{CollectionMetadata, PersistedMetadata};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{GlobalArgs, resolve_layout};

/// Inspect command handler
pub fn cmd_inspect(
    args: GlobalArgs<'_>,
    window: Option<u32>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let layout = resolve_layout(args)?;

    let snapshots = match window {
        Some(index) => {
            let path = layout.metadata_path(InstanceId::new(index));
            if !path.is_file() {
                return Err(CliError::WindowNotFound(index));
            }
            vec![PersistedMetadata::load_from_file(&path)?]
        }
        None => layout
            .list_metadata_files()?
            .into_iter()
            .map(|(_, path)| PersistedMetadata::load_from_file(&path))
            .collect::<Result<Vec<_>, _>>()?,
    };
    tracing::debug!(
        state_dir = %layout.state_dir().display(),
        windows = snapshots.len(),
        "Loaded window metadata"
    );

    match format {
        OutputFormat::Table => println!("{}", format_table(&snapshots)),
        OutputFormat::Json => println!("{}", format_json(&snapshots, window.is_some())?),
    }
    Ok(())
}

/// Format window snapshots as tables
#[must_use]
pub fn format_table(snapshots: &[PersistedMetadata]) -> String {
    if snapshots.is_empty() {
        return "No persisted windows found.".to_string();
    }

    let mut output = String::new();
    for snapshot in snapshots {
        let _ = writeln!(
            output,
            "Window {}  saved {}  current: {}",
            snapshot.window.index(),
            snapshot.saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
            if snapshot.incognito_selected {
                "incognito"
            } else {
                "regular"
            }
        );
        write_collection(&mut output, "Regular", &snapshot.regular);
        write_collection(&mut output, "Incognito", &snapshot.incognito);
        output.push('\n');
    }
    output.trim_end().to_string()
}

fn write_collection(output: &mut String, label: &str, collection: &CollectionMetadata) {
    let _ = writeln!(
        output,
        "  {label}: {} tabs, {} groups",
        collection.tabs.len(),
        collection.groups.len()
    );
    if collection.tabs.is_empty() {
        return;
    }

    let group_label = |tab_group: Option<TabGroupId>| {
        collection
            .groups
            .iter()
            .position(|g| Some(g.id) == tab_group)
            .map(|i| {
                let title = &collection.groups[i].visual_data.title;
                if title.is_empty() {
                    format!("#{}", i + 1)
                } else {
                    title.clone()
                }
            })
            .unwrap_or_default()
    };
    let labels: Vec<String> = collection.tabs.iter().map(|t| group_label(t.group_id)).collect();

    let id_width = collection
        .tabs
        .iter()
        .map(|t| t.id.get().to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let group_width = labels.iter().map(String::len).max().unwrap_or(5).max(5);

    let _ = writeln!(
        output,
        "    {:<3}  {:<5}  {:<id_width$}  {:<6}  {:<group_width$}  URL",
        "SEL", "INDEX", "ID", "PINNED", "GROUP"
    );
    for (index, (tab, group)) in collection.tabs.iter().zip(&labels).enumerate() {
        let selected = if collection.selected_index == Some(index) {
            "*"
        } else {
            ""
        };
        let _ = writeln!(
            output,
            "    {:<3}  {:<5}  {:<id_width$}  {:<6}  {:<group_width$}  {}",
            selected,
            index,
            tab.id.get(),
            if tab.pinned { "yes" } else { "no" },
            group,
            tab.url
        );
    }
}

/// Format window snapshots as JSON; a single requested window is printed as
/// an object rather than a list.
///
/// # Errors
///
/// Returns `CliError::Output` if JSON serialization fails.
pub fn format_json(snapshots: &[PersistedMetadata], single: bool) -> Result<String, CliError> {
    let result = match snapshots {
        [snapshot] if single => serde_json::to_string_pretty(snapshot),
        _ => serde_json::to_string_pretty(snapshots),
    };
    result.map_err(|e| CliError::Output(format!("Failed to serialize to JSON: {e}")))
}
