//! Loading and saving a window's tabs

use std::cell::RefCell;
use std::rc::Rc;

use tracing::Instrument;

use super::coordinator::{PersistenceCoordinator, run_blocking};
use super::layout::StateLayout;
use super::metadata::{CollectionMetadata, PersistedMetadata};
use super::migration::{LegacyLayoutMigration, MigrationHandle, MigrationOutcome};
use super::tab_state::TabStateStore;
use crate::config::PersistenceSettings;
use crate::error::{PersistenceError, PersistenceResult};
use crate::model::TabModelSelector;
use crate::tab::{InstanceId, ProfileMode, Tab, TabCreationState, TabLaunchType, TabSelectionType};
use crate::tracing::span_names;

/// What [`TabPersistentStore::load_state`] restored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Tabs added to the selector
    pub restored: usize,
    /// Entries that could not be added
    pub skipped: usize,
    /// Groups whose visual data was restored
    pub groups: usize,
    /// Whether the incognito collection was made current
    pub incognito_selected: bool,
}

/// Persists one window's selector and restores it on startup
#[derive(Debug)]
pub struct TabPersistentStore {
    layout: StateLayout,
    window: InstanceId,
    coordinator: Rc<RefCell<PersistenceCoordinator>>,
    migration: Option<MigrationHandle>,
    migration_outcome: Option<MigrationOutcome>,
}

impl TabPersistentStore {
    /// Creates a store below the configured state directory.
    ///
    /// Window 0 also starts the legacy layout migration in the background.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NoStateDir` if no state directory is
    /// configured and none can be determined.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(settings: PersistenceSettings, window: InstanceId) -> PersistenceResult<Self> {
        let base = settings
            .resolve_state_dir()
            .ok_or(PersistenceError::NoStateDir)?;
        Ok(Self::with_layout(StateLayout::new(base), window, settings))
    }

    /// Creates a store for an explicit layout.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn with_layout(layout: StateLayout, window: InstanceId, settings: PersistenceSettings) -> Self {
        let migration = (window.index() == 0)
            .then(|| LegacyLayoutMigration::new(layout.clone()).spawn());
        let coordinator = PersistenceCoordinator::new(layout.clone(), window, settings);
        Self {
            layout,
            window,
            coordinator: Rc::new(RefCell::new(coordinator)),
            migration,
            migration_outcome: None,
        }
    }

    /// The layout this store reads and writes
    #[must_use]
    pub const fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Window this store persists
    #[must_use]
    pub const fn window(&self) -> InstanceId {
        self.window
    }

    /// Shared handle to the coordinator
    #[must_use]
    pub fn coordinator(&self) -> Rc<RefCell<PersistenceCoordinator>> {
        Rc::clone(&self.coordinator)
    }

    /// Tab file access for this layout
    #[must_use]
    pub fn tab_state_store(&self) -> TabStateStore {
        TabStateStore::new(self.layout.clone())
    }

    /// Outcome of the legacy migration, once awaited
    #[must_use]
    pub const fn migration_outcome(&self) -> Option<MigrationOutcome> {
        self.migration_outcome
    }

    /// Registers the coordinator on both collections of `selector` and
    /// snapshots its current state.
    pub fn attach(&self, selector: &mut TabModelSelector) {
        selector.add_mutation_observer(self.coordinator.clone());
        selector.add_closure_observer(self.coordinator.clone());
        self.coordinator.borrow_mut().sync_from_selector(selector);
    }

    /// Waits for the legacy migration if one is running. Failures are logged;
    /// loading proceeds with whatever layout is on disk.
    pub async fn wait_for_migration(&mut self) {
        let Some(handle) = self.migration.take() else {
            return;
        };
        match handle.wait().await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "Legacy migration finished");
                self.migration_outcome = Some(outcome);
            }
            Err(e) => tracing::warn!(error = %e, "Legacy migration failed"),
        }
    }

    /// Restores the persisted tabs of this window into `selector`.
    ///
    /// Tabs are added frozen, in their saved order, followed by group visual
    /// data, the selection of each collection and the current mode. A missing
    /// metadata file restores nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata file exists but cannot be read, or
    /// the selector is not initialized.
    pub async fn load_state(
        &mut self,
        selector: &mut TabModelSelector,
    ) -> PersistenceResult<RestoreSummary> {
        self.wait_for_migration().await;

        let path = self.layout.metadata_path(self.window);
        let metadata = run_blocking(move || {
            if path.is_file() {
                PersistedMetadata::load_from_file(&path).map(Some)
            } else {
                Ok(None)
            }
        })
        .instrument(tracing::info_span!(span_names::RESTORE, window = %self.window))
        .await?;
        let Some(metadata) = metadata else {
            tracing::info!(window = %self.window, "No persisted tab state");
            return Ok(RestoreSummary::default());
        };

        self.coordinator.borrow_mut().set_restoring(true);
        let result = self.restore(selector, &metadata);
        self.coordinator.borrow_mut().set_restoring(false);
        let summary = result?;

        self.coordinator.borrow_mut().sync_from_selector(selector);
        tracing::info!(
            window = %self.window,
            restored = summary.restored,
            skipped = summary.skipped,
            groups = summary.groups,
            "Tab state restored"
        );
        Ok(summary)
    }

    fn restore(
        &self,
        selector: &mut TabModelSelector,
        metadata: &PersistedMetadata,
    ) -> PersistenceResult<RestoreSummary> {
        let files = self.tab_state_store();
        let allocator = selector.allocator().clone();
        let mut summary = RestoreSummary::default();

        for mode in [ProfileMode::Regular, ProfileMode::Incognito] {
            let saved: &CollectionMetadata = metadata.collection(mode);
            let model = selector.model_mut(mode.is_incognito())?;

            for entry in &saved.tabs {
                let content = match files.read(entry.id, mode.is_incognito()) {
                    Ok(state) => state.map(|s| s.content).unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!(tab_id = %entry.id, error = %e, "Unreadable tab file");
                        Vec::new()
                    }
                };
                let tab = Tab::new(entry.id, mode, entry.url.clone())
                    .with_title(entry.title.clone())
                    .with_content(content)
                    .pinned(entry.pinned)
                    .in_group(entry.group_id);
                allocator.ensure_above(entry.id);
                if model.add_tab(
                    tab,
                    None,
                    TabLaunchType::FromRestore,
                    TabCreationState::FrozenOnRestore,
                ) {
                    summary.restored += 1;
                } else {
                    tracing::debug!(tab_id = %entry.id, "Skipping persisted tab");
                    summary.skipped += 1;
                }
            }

            for group in &saved.groups {
                if model
                    .try_set_tab_group_visual_data(group.id, group.visual_data.clone())
                    .is_ok()
                {
                    summary.groups += 1;
                }
            }

            if let Some(index) = saved.selected_index {
                model.set_index(index, TabSelectionType::FromUser);
            }
        }

        selector.select_model(metadata.incognito_selected);
        summary.incognito_selected = selector.is_incognito_selected();
        Ok(summary)
    }

    /// Writes queued tab files, then the current snapshot
    ///
    /// # Errors
    /// Returns an error if a worker has stopped or the write fails
    pub async fn save_state(&self) -> PersistenceResult<()> {
        let flush = self.coordinator.borrow_mut().flush();
        flush.await
    }
}
