//! One-time move of the legacy flat layout into the state directory
//!
//! Older releases kept a single `tab_state` file and the tab files directly in
//! the base directory. The migration moves the recognized files into
//! `<base>/0/`, renaming `tab_state` to `tab_state0`. Unrelated files are left
//! alone and existing destination files are never overwritten.
//!
//! Files that could not be moved are listed in the record and retried on the
//! next run; the migration counts as complete once that list is empty.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::layout::{StateLayout, list_file_names};
use crate::error::MigrationError;
use crate::tab::InstanceId;
use crate::tracing::span_names;

/// Contents of the migration record file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// When the migration finished
    pub completed_at: DateTime<Utc>,
    /// Number of files moved
    pub moved: usize,
    /// Legacy file names left in the base directory after a failed move
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
}

/// Result of a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// A previous run already recorded completion
    AlreadyMigrated,
    /// The state directory already had content; nothing was moved
    SkippedDestinationNotEmpty,
    /// No legacy files were found
    NothingToMigrate,
    /// Legacy files were moved
    Migrated {
        /// Files moved
        moved: usize,
        /// Files left in place because of an error
        failed: usize,
    },
}

/// Moves the legacy layout below a base directory
#[derive(Debug, Clone)]
pub struct LegacyLayoutMigration {
    layout: StateLayout,
}

impl LegacyLayoutMigration {
    /// Creates a migration for a layout
    #[must_use]
    pub const fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    /// Whether a record exists with no files left to retry
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.read_record()
            .is_some_and(|record| record.pending.is_empty())
    }

    /// The record of a previous run, if any. An unreadable record counts as
    /// complete.
    #[must_use]
    pub fn read_record(&self) -> Option<MigrationRecord> {
        let content = std::fs::read_to_string(self.layout.migration_record_path()).ok()?;
        Some(serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable migration record, treating as complete");
            MigrationRecord {
                completed_at: Utc::now(),
                moved: 0,
                pending: Vec::new(),
            }
        }))
    }

    /// Runs the migration on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read or created, or the
    /// record cannot be written. Failures to move single files are counted
    /// in [`MigrationOutcome::Migrated`] instead and retried on the next run.
    pub fn run(&self) -> Result<MigrationOutcome, MigrationError> {
        let _span = tracing::info_span!(span_names::LEGACY_MIGRATION).entered();
        if let Some(record) = self.read_record() {
            if record.pending.is_empty() {
                tracing::debug!("Legacy tab state already migrated");
                return Ok(MigrationOutcome::AlreadyMigrated);
            }
            return self.retry_pending(&record);
        }

        let state_dir = self.layout.state_dir();
        if dir_has_entries(&state_dir)? {
            tracing::info!(dir = %state_dir.display(), "State directory not empty, skipping migration");
            self.write_record(0, Vec::new())?;
            return Ok(MigrationOutcome::SkippedDestinationNotEmpty);
        }

        let candidates = self.legacy_files()?;
        if candidates.is_empty() {
            self.write_record(0, Vec::new())?;
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        std::fs::create_dir_all(&state_dir)?;
        let (moved, pending) = self.move_files(candidates);
        let failed = pending.len();
        self.write_record(moved, pending)?;
        tracing::info!(moved, failed, "Legacy tab state migration finished");
        Ok(MigrationOutcome::Migrated { moved, failed })
    }

    /// Moves the files a previous run left behind. Names whose source is gone
    /// are dropped from the record.
    fn retry_pending(&self, record: &MigrationRecord) -> Result<MigrationOutcome, MigrationError> {
        let candidates: Vec<_> = self
            .legacy_files()?
            .into_iter()
            .filter(|(from, _)| {
                from.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| record.pending.iter().any(|p| p == name))
            })
            .collect();

        std::fs::create_dir_all(self.layout.state_dir())?;
        let (moved, pending) = self.move_files(candidates);
        let failed = pending.len();
        self.write_record(record.moved + moved, pending)?;
        tracing::info!(moved, failed, "Retried pending legacy tab state files");
        Ok(MigrationOutcome::Migrated { moved, failed })
    }

    /// Moves each candidate into the state directory; returns the number moved
    /// and the source names left in place.
    fn move_files(&self, candidates: Vec<(PathBuf, String)>) -> (usize, Vec<String>) {
        let state_dir = self.layout.state_dir();
        let mut moved = 0;
        let mut pending = Vec::new();
        for (from, name) in candidates {
            let source_name = from
                .file_name()
                .and_then(|n| n.to_str())
                .map_or_else(|| name.clone(), str::to_string);
            let to = state_dir.join(&name);
            if to.exists() {
                tracing::warn!(file = %name, "Destination exists, leaving legacy file in place");
                pending.push(source_name);
                continue;
            }
            match std::fs::rename(&from, &to) {
                Ok(()) => moved += 1,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to move legacy file");
                    pending.push(source_name);
                }
            }
        }
        (moved, pending)
    }

    /// Runs the migration on a blocking task
    #[must_use]
    pub fn spawn(self) -> MigrationHandle {
        MigrationHandle {
            handle: tokio::task::spawn_blocking(move || self.run()),
        }
    }

    /// Legacy files as `(source path, destination name)`
    fn legacy_files(&self) -> Result<Vec<(PathBuf, String)>, MigrationError> {
        let mut files = Vec::new();
        for (name, path) in list_file_names(self.layout.base_dir())? {
            if path == self.layout.legacy_metadata_path() {
                files.push((path, StateLayout::metadata_file_name(InstanceId::new(0))));
            } else if StateLayout::parse_tab_file_name(&name).is_some() {
                files.push((path, name));
            }
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }

    fn write_record(&self, moved: usize, pending: Vec<String>) -> Result<(), MigrationError> {
        let record = MigrationRecord {
            completed_at: Utc::now(),
            moved,
            pending,
        };
        std::fs::create_dir_all(self.layout.base_dir())?;
        std::fs::write(
            self.layout.migration_record_path(),
            serde_json::to_string_pretty(&record)?,
        )?;
        Ok(())
    }
}

fn dir_has_entries(dir: &std::path::Path) -> std::io::Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// A migration running in the background
#[derive(Debug)]
pub struct MigrationHandle {
    handle: JoinHandle<Result<MigrationOutcome, MigrationError>>,
}

impl MigrationHandle {
    /// Whether the task has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the migration to finish
    ///
    /// # Errors
    /// Returns the migration error, or `TaskFailed` if the task panicked
    pub async fn wait(self) -> Result<MigrationOutcome, MigrationError> {
        self.handle
            .await
            .map_err(|e| MigrationError::TaskFailed(e.to_string()))?
    }
}
