//! Background persistence of a window's tab state
//!
//! The [`PersistenceCoordinator`] observes both collections of a window and
//! keeps an in-memory metadata snapshot current. Metadata saves go through a
//! `watch` channel drained by a single worker, so at most one save is in
//! flight and a newer snapshot replaces any that has not been written yet.
//! Tab file writes and deletes go through an ordered `mpsc` queue.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;

use super::layout::StateLayout;
use super::metadata::{CollectionMetadata, PersistedMetadata};
use super::tab_state::{TabState, TabStateStore};
use crate::config::PersistenceSettings;
use crate::error::{PersistenceError, PersistenceResult};
use crate::model::{
    ModelRequests, TabClosureObserver, TabCollection, TabModelSelector, TabMutationObserver,
};
use crate::tab::{
    InstanceId, Tab, TabCreationState, TabGroupId, TabId, TabLaunchType, TabSelectionType,
};
use crate::tracing::span_names;

/// Completion reports from the background workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceEvent {
    /// A metadata snapshot reached disk
    MetadataSaved {
        /// Window the snapshot belongs to
        window: InstanceId,
        /// Tabs in the snapshot
        tab_count: usize,
    },
    /// A tab file was written
    TabStateWritten {
        /// Tab id
        tab_id: TabId,
        /// Whether the tab is incognito
        incognito: bool,
    },
    /// A tab file was deleted
    TabStateDeleted {
        /// Tab id
        tab_id: TabId,
        /// Whether the tab is incognito
        incognito: bool,
    },
    /// A background write failed
    SaveFailed {
        /// Error description
        reason: String,
    },
}

/// Callback run once a metadata save has completed
pub type SaveCallback = Box<dyn FnOnce() + Send>;

/// Runs blocking persistence work off the async threads
pub(crate) async fn run_blocking<T, F>(f: F) -> PersistenceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> PersistenceResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| PersistenceError::WorkerStopped)?
}

#[derive(Debug, Clone)]
struct MetadataJob {
    generation: u64,
    metadata: PersistedMetadata,
}

struct MetadataWriter {
    path: PathBuf,
    last_generation: tokio::sync::Mutex<u64>,
    completions: std::sync::Mutex<Vec<(u64, SaveCallback)>>,
    events: mpsc::UnboundedSender<PersistenceEvent>,
    paused: AtomicBool,
}

impl MetadataWriter {
    fn add_completion(&self, generation: u64, callback: SaveCallback) {
        self.completions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((generation, callback));
    }

    /// Writes a job unless a newer one has already been written.
    async fn write(&self, job: MetadataJob) -> PersistenceResult<()> {
        let mut last = self.last_generation.lock().await;
        if job.generation <= *last {
            tracing::trace!(generation = job.generation, "Skipping stale metadata save");
            return Ok(());
        }

        let window = job.metadata.window;
        let tab_count = job.metadata.tab_count();
        let path = self.path.clone();
        let metadata = job.metadata;
        let span = tracing::info_span!(
            span_names::METADATA_SAVE,
            window = %window,
            generation = job.generation
        );
        if let Err(e) = run_blocking(move || metadata.save_to_file(&path))
            .instrument(span)
            .await
        {
            tracing::error!(window = %window, error = %e, "Failed to save tab metadata");
            let _ = self.events.send(PersistenceEvent::SaveFailed {
                reason: e.to_string(),
            });
            return Err(e);
        }
        *last = job.generation;
        drop(last);

        tracing::debug!(window = %window, tab_count, generation = job.generation, "Tab metadata saved");
        let _ = self
            .events
            .send(PersistenceEvent::MetadataSaved { window, tab_count });

        let ready: Vec<SaveCallback> = {
            let mut completions = self
                .completions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let (ready, pending): (Vec<_>, Vec<_>) = completions
                .drain(..)
                .partition(|(generation, _)| *generation <= job.generation);
            *completions = pending;
            ready.into_iter().map(|(_, callback)| callback).collect()
        };
        for callback in ready {
            callback();
        }
        Ok(())
    }
}

/// Metadata worker: waits for a new snapshot, debounces, then writes the
/// latest one.
async fn metadata_worker(
    mut rx: watch::Receiver<Option<MetadataJob>>,
    writer: Arc<MetadataWriter>,
    debounce: Duration,
) {
    loop {
        if rx.changed().await.is_err() {
            break;
        }

        if !debounce.is_zero() {
            loop {
                tokio::select! {
                    result = rx.changed() => {
                        if result.is_err() {
                            break;
                        }
                    }
                    () = tokio::time::sleep(debounce) => break,
                }
            }
        }

        let job = rx.borrow_and_update().clone();
        if writer.paused.load(Ordering::Acquire) {
            tracing::trace!("Dropping queued metadata save while paused");
            continue;
        }
        if let Some(job) = job
            && let Err(e) = writer.write(job).await
        {
            tracing::debug!(error = %e, "Background metadata save failed");
        }
    }
    tracing::trace!("Metadata worker stopped");
}

enum TabFileTask {
    Write { tab_id: TabId, state: TabState },
    Delete { tab_id: TabId, incognito: bool },
    Barrier(oneshot::Sender<()>),
}

/// Tab file worker: applies writes and deletes in submission order.
async fn tab_file_worker(
    mut rx: mpsc::UnboundedReceiver<TabFileTask>,
    store: TabStateStore,
    events: mpsc::UnboundedSender<PersistenceEvent>,
) {
    while let Some(task) = rx.recv().await {
        let event = match task {
            TabFileTask::Write { tab_id, state } => {
                let incognito = state.incognito;
                let store = store.clone();
                run_blocking(move || store.write(tab_id, &state))
                    .await
                    .map(|()| PersistenceEvent::TabStateWritten { tab_id, incognito })
            }
            TabFileTask::Delete { tab_id, incognito } => {
                let store = store.clone();
                run_blocking(move || store.delete(tab_id, incognito))
                    .await
                    .map(|_| PersistenceEvent::TabStateDeleted { tab_id, incognito })
            }
            TabFileTask::Barrier(done) => {
                let _ = done.send(());
                continue;
            }
        };
        let event = event.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Tab file operation failed");
            PersistenceEvent::SaveFailed {
                reason: e.to_string(),
            }
        });
        let _ = events.send(event);
    }
    tracing::trace!("Tab file worker stopped");
}

/// Observes a window's collections and persists their state
pub struct PersistenceCoordinator {
    window: InstanceId,
    layout: StateLayout,
    settings: PersistenceSettings,
    snapshot: PersistedMetadata,
    metadata_tx: watch::Sender<Option<MetadataJob>>,
    tab_tx: mpsc::UnboundedSender<TabFileTask>,
    writer: Arc<MetadataWriter>,
    events_rx: Option<mpsc::UnboundedReceiver<PersistenceEvent>>,
    paused: bool,
    dirty: bool,
    restoring: bool,
    generation: u64,
}

impl fmt::Debug for PersistenceCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceCoordinator")
            .field("window", &self.window)
            .field("layout", &self.layout)
            .field("paused", &self.paused)
            .field("dirty", &self.dirty)
            .field("restoring", &self.restoring)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl PersistenceCoordinator {
    /// Creates a coordinator and spawns its workers.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(layout: StateLayout, window: InstanceId, settings: PersistenceSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (metadata_tx, metadata_rx) = watch::channel(None);
        let (tab_tx, tab_rx) = mpsc::unbounded_channel();

        let writer = Arc::new(MetadataWriter {
            path: layout.metadata_path(window),
            last_generation: tokio::sync::Mutex::new(0),
            completions: std::sync::Mutex::new(Vec::new()),
            events: events_tx.clone(),
            paused: AtomicBool::new(false),
        });

        tokio::spawn(metadata_worker(
            metadata_rx,
            Arc::clone(&writer),
            settings.save_debounce(),
        ));
        tokio::spawn(tab_file_worker(
            tab_rx,
            TabStateStore::new(layout.clone()),
            events_tx,
        ));

        Self {
            window,
            layout,
            settings,
            snapshot: PersistedMetadata::new(window),
            metadata_tx,
            tab_tx,
            writer,
            events_rx: Some(events_rx),
            paused: false,
            dirty: false,
            restoring: false,
            generation: 0,
        }
    }

    /// Window this coordinator persists
    #[must_use]
    pub const fn window(&self) -> InstanceId {
        self.window
    }

    /// The layout written to
    #[must_use]
    pub const fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// The current in-memory snapshot
    #[must_use]
    pub const fn snapshot(&self) -> &PersistedMetadata {
        &self.snapshot
    }

    /// Whether metadata saves are paused
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a restore is in progress
    #[must_use]
    pub const fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Takes the event receiver; returns `None` after the first call
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<PersistenceEvent>> {
        self.events_rx.take()
    }

    /// Replaces the snapshot with the selector's current state
    pub fn sync_from_selector(&mut self, selector: &TabModelSelector) {
        self.snapshot = PersistedMetadata::from_selector(self.window, selector);
    }

    /// While restoring, saves are not scheduled and tab files are not
    /// rewritten.
    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }

    fn next_job(&mut self) -> MetadataJob {
        self.generation += 1;
        self.snapshot.saved_at = chrono::Utc::now();
        MetadataJob {
            generation: self.generation,
            metadata: self.snapshot.clone(),
        }
    }

    /// Schedules a background save of the current snapshot
    pub fn schedule_save(&mut self) {
        if self.restoring {
            return;
        }
        if self.paused {
            self.dirty = true;
            return;
        }
        let job = self.next_job();
        tracing::trace!(generation = job.generation, "Metadata save scheduled");
        self.metadata_tx.send_replace(Some(job));
    }

    /// Stops metadata saves until [`Self::resume_save_tab_list`]. A save still
    /// waiting out the debounce is withdrawn and redone on resume. Tab file
    /// writes and deletes continue.
    pub fn pause_save_tab_list(&mut self) {
        if !self.settings.pause_list_saves {
            tracing::debug!("Pausing tab list saves is disabled");
            return;
        }
        tracing::debug!(window = %self.window, "Tab list saves paused");
        self.paused = true;
        self.writer.paused.store(true, Ordering::Release);
        if self.metadata_tx.send_replace(None).is_some() {
            self.dirty = true;
        }
    }

    /// Resumes metadata saves and schedules exactly one save; `on_complete`
    /// runs once that save has been written.
    pub fn resume_save_tab_list(&mut self, on_complete: Option<SaveCallback>) {
        let had_changes = std::mem::take(&mut self.dirty);
        self.paused = false;
        self.writer.paused.store(false, Ordering::Release);
        let job = self.next_job();
        if let Some(callback) = on_complete {
            self.writer.add_completion(job.generation, callback);
        }
        tracing::debug!(window = %self.window, had_changes, "Tab list saves resumed");
        self.metadata_tx.send_replace(Some(job));
    }

    /// Writes the current snapshot now, bypassing pause and debounce
    pub fn save_state(&mut self) -> impl Future<Output = PersistenceResult<()>> + use<> {
        self.metadata_tx.send_replace(None);
        self.dirty = false;
        let job = self.next_job();
        let writer = Arc::clone(&self.writer);
        async move { writer.write(job).await }
    }

    /// Resolves once every queued tab file operation has been applied
    pub fn wait_for_tab_files(&self) -> impl Future<Output = PersistenceResult<()>> + use<> {
        let (tx, rx) = oneshot::channel();
        let sent = self.tab_tx.send(TabFileTask::Barrier(tx));
        async move {
            sent.map_err(|_| PersistenceError::WorkerStopped)?;
            rx.await.map_err(|_| PersistenceError::WorkerStopped)
        }
    }

    /// Waits for queued tab file operations, then writes the snapshot
    pub fn flush(&mut self) -> impl Future<Output = PersistenceResult<()>> + use<> {
        let files = self.wait_for_tab_files();
        let save = self.save_state();
        async move {
            files.await?;
            save.await
        }
    }

    /// Queues a write of a tab's file; skipped while restoring
    pub fn save_tab_state(&self, tab: &Tab) {
        if self.restoring {
            return;
        }
        let task = TabFileTask::Write {
            tab_id: tab.id(),
            state: TabState::from_tab(tab),
        };
        if self.tab_tx.send(task).is_err() {
            tracing::error!(tab_id = %tab.id(), "Tab file worker stopped");
        }
    }

    /// Queues deletion of a tab's file
    pub fn delete_tab_state(&self, tab_id: TabId, incognito: bool) {
        if self.tab_tx.send(TabFileTask::Delete { tab_id, incognito }).is_err() {
            tracing::error!(tab_id = %tab_id, "Tab file worker stopped");
        }
    }

    fn collection_changed(&mut self, model: &TabCollection) {
        *self.snapshot.collection_mut(model.mode()) = CollectionMetadata::from_collection(model);
        self.schedule_save();
    }
}

impl TabMutationObserver for PersistenceCoordinator {
    fn did_add_tab(
        &mut self,
        model: &TabCollection,
        tab_id: TabId,
        _launch_type: TabLaunchType,
        _creation_state: TabCreationState,
        _requests: &mut ModelRequests,
    ) {
        if let Some(tab) = model.get_tab(tab_id) {
            self.save_tab_state(tab);
        }
        self.collection_changed(model);
    }

    fn did_select_tab(
        &mut self,
        model: &TabCollection,
        _tab_id: TabId,
        _selection_type: TabSelectionType,
        _last_id: TabId,
    ) {
        self.collection_changed(model);
    }

    fn did_move_tab(&mut self, model: &TabCollection, _tab_id: TabId, _new: usize, _old: usize) {
        self.collection_changed(model);
    }

    // The tab lives on in another window, so its file stays.
    fn tab_removed(&mut self, model: &TabCollection, _tab: &Tab) {
        self.collection_changed(model);
    }

    fn did_change_pinned_state(&mut self, model: &TabCollection, _tab_id: TabId) {
        self.collection_changed(model);
    }

    fn did_merge_tab_to_group(&mut self, model: &TabCollection, _tab_id: TabId, _group_id: TabGroupId) {
        self.collection_changed(model);
    }

    fn did_remove_tab_from_group(
        &mut self,
        model: &TabCollection,
        _tab_id: TabId,
        _previous_group: TabGroupId,
    ) {
        self.collection_changed(model);
    }

    fn did_change_group_visual_data(&mut self, model: &TabCollection, _group_id: TabGroupId) {
        self.collection_changed(model);
    }

    fn did_remove_tab_group(&mut self, model: &TabCollection, _group_id: TabGroupId) {
        self.collection_changed(model);
    }

    fn did_change_current_model(&mut self, model: &TabCollection) {
        self.snapshot.incognito_selected = model.is_incognito();
        self.schedule_save();
    }
}

impl TabClosureObserver for PersistenceCoordinator {
    fn tab_pending_closure(&mut self, model: &TabCollection, _tab: &Tab) {
        self.collection_changed(model);
    }

    fn tab_closure_undone(&mut self, model: &TabCollection, _tab: &Tab) {
        self.collection_changed(model);
    }

    fn tab_closure_committed(&mut self, model: &TabCollection, tab: &Tab) {
        self.delete_tab_state(tab.id(), tab.is_incognito());
        self.collection_changed(model);
    }
}
