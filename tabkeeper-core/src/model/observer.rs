//! Observer interfaces for collection changes
//!
//! Observers are shared as `Rc<RefCell<dyn ...>>` and called synchronously
//! after the collection state has changed. Every method has a no-op default,
//! so implementors only override what they care about.
//!
//! Observers cannot mutate the collection they are notified about. Instead,
//! `will_add_tab` and `did_add_tab` receive a [`ModelRequests`] queue; the
//! collection applies the queued requests right after the callbacks return.

use std::cell::RefCell;
use std::rc::Rc;

use super::closure::ClosureParams;
use super::collection::TabCollection;
use crate::tab::{Tab, TabCreationState, TabGroupId, TabId, TabLaunchType, TabSelectionType};

/// A mutation requested from inside an observer callback
#[derive(Debug, Clone)]
pub enum ModelRequest {
    /// Add a tab
    AddTab {
        /// Tab to add
        tab: Tab,
        /// Live-view insertion index, `None` appends
        index: Option<usize>,
        /// Launch type
        launch_type: TabLaunchType,
        /// Creation state
        creation_state: TabCreationState,
    },
    /// Close tabs
    CloseTabs(ClosureParams),
    /// Cancel a pending closure (`TabId::INVALID` cancels all)
    CancelTabClosure(TabId),
    /// Commit every pending closure
    CommitAllTabClosures,
    /// Change the selection
    SetIndex(usize, TabSelectionType),
}

/// Queue of requests issued by observers during a callback
#[derive(Debug, Default)]
pub struct ModelRequests {
    queue: Vec<ModelRequest>,
}

impl ModelRequests {
    /// Queues an arbitrary request.
    pub fn push(&mut self, request: ModelRequest) {
        self.queue.push(request);
    }

    /// Queues a closure request.
    pub fn close_tabs(&mut self, params: ClosureParams) {
        self.push(ModelRequest::CloseTabs(params));
    }

    /// Queues a closure cancellation.
    pub fn cancel_tab_closure(&mut self, tab_id: TabId) {
        self.push(ModelRequest::CancelTabClosure(tab_id));
    }

    /// Queues a commit of every pending closure.
    pub fn commit_all_tab_closures(&mut self) {
        self.push(ModelRequest::CommitAllTabClosures);
    }

    /// Queues a selection change.
    pub fn set_index(&mut self, index: usize, selection_type: TabSelectionType) {
        self.push(ModelRequest::SetIndex(index, selection_type));
    }

    /// Returns true if nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn into_vec(self) -> Vec<ModelRequest> {
        self.queue
    }
}

/// Structural changes to a collection
#[allow(unused_variables)]
pub trait TabMutationObserver {
    /// A tab is about to be inserted
    fn will_add_tab(
        &mut self,
        model: &TabCollection,
        tab: &Tab,
        launch_type: TabLaunchType,
        requests: &mut ModelRequests,
    ) {
    }

    /// A tab was inserted
    fn did_add_tab(
        &mut self,
        model: &TabCollection,
        tab_id: TabId,
        launch_type: TabLaunchType,
        creation_state: TabCreationState,
        requests: &mut ModelRequests,
    ) {
    }

    /// The selection changed. `last_id` is `TabId::INVALID` when nothing was
    /// selected before.
    fn did_select_tab(
        &mut self,
        model: &TabCollection,
        tab_id: TabId,
        selection_type: TabSelectionType,
        last_id: TabId,
    ) {
    }

    /// A tab moved within the live view
    fn did_move_tab(&mut self, model: &TabCollection, tab_id: TabId, new_index: usize, old_index: usize) {}

    /// A tab was detached without closure (e.g. moved to another window)
    fn tab_removed(&mut self, model: &TabCollection, tab: &Tab) {}

    /// A tab was pinned or unpinned
    fn did_change_pinned_state(&mut self, model: &TabCollection, tab_id: TabId) {}

    /// A tab joined a group
    fn did_merge_tab_to_group(&mut self, model: &TabCollection, tab_id: TabId, group_id: TabGroupId) {}

    /// A tab left a group
    fn did_remove_tab_from_group(
        &mut self,
        model: &TabCollection,
        tab_id: TabId,
        previous_group: TabGroupId,
    ) {
    }

    /// A group's title, color or collapsed state changed
    fn did_change_group_visual_data(&mut self, model: &TabCollection, group_id: TabGroupId) {}

    /// A group lost its last member and was removed
    fn did_remove_tab_group(&mut self, model: &TabCollection, group_id: TabGroupId) {}

    /// The selector switched its current collection
    fn did_change_current_model(&mut self, model: &TabCollection) {}
}

/// Closure lifecycle of tabs
#[allow(unused_variables)]
pub trait TabClosureObserver {
    /// A tab is about to be closed (pending or committed)
    fn will_close_tab(&mut self, model: &TabCollection, tab: &Tab) {}

    /// A tab became pending closure
    fn tab_pending_closure(&mut self, model: &TabCollection, tab: &Tab) {}

    /// A pending closure was cancelled
    fn tab_closure_undone(&mut self, model: &TabCollection, tab: &Tab) {}

    /// A closure was committed; the tab is gone
    fn tab_closure_committed(&mut self, model: &TabCollection, tab: &Tab) {}

    /// A commit left the collection without any tab, live or pending
    fn all_tabs_closure_committed(&mut self, model: &TabCollection) {}
}

/// Shared handle to a mutation observer
pub type SharedMutationObserver = Rc<RefCell<dyn TabMutationObserver>>;

/// Shared handle to a closure observer
pub type SharedClosureObserver = Rc<RefCell<dyn TabClosureObserver>>;
