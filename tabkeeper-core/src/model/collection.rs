//! Ordered tab collection for one browsing mode
//!
//! [`TabCollection`] keeps every tab of a mode in a single comprehensive
//! order. Tabs pending closure stay in that order (so undo restores their
//! position) but are excluded from the live view that indices refer to.
//!
//! The collection maintains these invariants after every public call:
//! - pinned tabs form a prefix of the comprehensive order
//! - pinned tabs are never grouped
//! - members of a group are contiguous
//! - a registered group has at least one member (live or pending)
//! - the selected tab, if any, is live

use std::fmt;
use std::rc::Rc;

use super::closure::{ClosureParams, ClosureTarget, ClosureTracker};
use super::groups::{GroupRegistry, TabGroupVisualData};
use super::observer::{
    ModelRequest, ModelRequests, SharedClosureObserver, SharedMutationObserver,
    TabClosureObserver, TabMutationObserver,
};
use crate::error::{TabError, TabResult};
use crate::tab::{
    ProfileMode, Tab, TabCreationState, TabGroupColor, TabGroupId, TabId, TabLaunchType,
    TabSelectionType,
};

/// Single-selection ordered collection of tabs for one browsing mode
pub struct TabCollection {
    mode: ProfileMode,
    /// Comprehensive order, pending-closure tabs included
    entries: Vec<Tab>,
    closures: ClosureTracker,
    groups: GroupRegistry,
    selected: Option<TabId>,
    /// Whether this is the selector's current collection
    active: bool,
    mutation_observers: Vec<SharedMutationObserver>,
    closure_observers: Vec<SharedClosureObserver>,
}

impl fmt::Debug for TabCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabCollection")
            .field("mode", &self.mode)
            .field("entries", &self.entries.len())
            .field("pending", &self.closures.len())
            .field("groups", &self.groups.len())
            .field("selected", &self.selected)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl TabCollection {
    /// Creates an empty, active collection for `mode`.
    #[must_use]
    pub fn new(mode: ProfileMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            closures: ClosureTracker::new(),
            groups: GroupRegistry::new(),
            selected: None,
            active: true,
            mutation_observers: Vec::new(),
            closure_observers: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Registers a mutation observer. Registering the same observer twice
    /// has no effect.
    pub fn add_mutation_observer(&mut self, observer: SharedMutationObserver) {
        if !self
            .mutation_observers
            .iter()
            .any(|o| Rc::ptr_eq(o, &observer))
        {
            self.mutation_observers.push(observer);
        }
    }

    /// Unregisters a mutation observer.
    pub fn remove_mutation_observer(&mut self, observer: &SharedMutationObserver) -> bool {
        let before = self.mutation_observers.len();
        self.mutation_observers.retain(|o| !Rc::ptr_eq(o, observer));
        before != self.mutation_observers.len()
    }

    /// Registers a closure observer. Registering the same observer twice
    /// has no effect.
    pub fn add_closure_observer(&mut self, observer: SharedClosureObserver) {
        if !self
            .closure_observers
            .iter()
            .any(|o| Rc::ptr_eq(o, &observer))
        {
            self.closure_observers.push(observer);
        }
    }

    /// Unregisters a closure observer.
    pub fn remove_closure_observer(&mut self, observer: &SharedClosureObserver) -> bool {
        let before = self.closure_observers.len();
        self.closure_observers.retain(|o| !Rc::ptr_eq(o, observer));
        before != self.closure_observers.len()
    }

    fn notify_mutation(&self, mut f: impl FnMut(&mut dyn TabMutationObserver, &Self)) {
        // Observers may register further observers on other collections while
        // being notified; iterate over a snapshot of the list.
        let observers = self.mutation_observers.clone();
        for observer in &observers {
            f(&mut *observer.borrow_mut(), self);
        }
    }

    fn notify_closure(&self, mut f: impl FnMut(&mut dyn TabClosureObserver, &Self)) {
        let observers = self.closure_observers.clone();
        for observer in &observers {
            f(&mut *observer.borrow_mut(), self);
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Returns the browsing mode of this collection
    #[must_use]
    pub const fn mode(&self) -> ProfileMode {
        self.mode
    }

    /// Returns true for the incognito collection
    #[must_use]
    pub const fn is_incognito(&self) -> bool {
        self.mode.is_incognito()
    }

    /// Returns true if this is the selector's current collection
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Iterates over live tabs in order
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> + '_ {
        self.entries
            .iter()
            .filter(|tab| !self.closures.is_pending(tab.id()))
    }

    /// Iterates over all tabs, pending closures included
    pub fn comprehensive_tabs(&self) -> impl Iterator<Item = &Tab> + '_ {
        self.entries.iter()
    }

    /// Number of live tabs
    #[must_use]
    pub fn count(&self) -> usize {
        self.tabs().count()
    }

    /// Number of tabs including pending closures
    #[must_use]
    pub fn comprehensive_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the collection has no live tab
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Live-view index of a tab
    #[must_use]
    pub fn index_of(&self, tab_id: TabId) -> Option<usize> {
        self.tabs().position(|tab| tab.id() == tab_id)
    }

    /// Live tab at `index`
    #[must_use]
    pub fn tab_at(&self, index: usize) -> Option<&Tab> {
        self.tabs().nth(index)
    }

    /// Looks up a tab by id, pending closures included
    #[must_use]
    pub fn get_tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.entries.iter().find(|tab| tab.id() == tab_id)
    }

    /// Returns true if the tab is held by this collection (live or pending)
    #[must_use]
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.get_tab(tab_id).is_some()
    }

    /// Live-view index of the selected tab, `None` if nothing is selected
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.index_of(id))
    }

    /// The selected tab
    #[must_use]
    pub fn selected_tab(&self) -> Option<&Tab> {
        self.selected.and_then(|id| self.get_tab(id))
    }

    /// Id of the selected tab
    #[must_use]
    pub const fn selected_tab_id(&self) -> Option<TabId> {
        self.selected
    }

    /// Returns true if the tab is pending closure
    #[must_use]
    pub fn is_pending_closure(&self, tab_id: TabId) -> bool {
        self.closures.is_pending(tab_id)
    }

    /// Number of tabs pending closure
    #[must_use]
    pub fn pending_closure_count(&self) -> usize {
        self.closures.len()
    }

    /// Number of live pinned tabs
    #[must_use]
    pub fn pinned_count(&self) -> usize {
        self.tabs().filter(|tab| tab.is_pinned()).count()
    }

    /// Live members of a group, in order
    #[must_use]
    pub fn tabs_in_group(&self, group_id: TabGroupId) -> Vec<TabId> {
        self.tabs()
            .filter(|tab| tab.group_id() == Some(group_id))
            .map(Tab::id)
            .collect()
    }

    /// Registered groups, ordered by position of their first member
    #[must_use]
    pub fn group_ids(&self) -> Vec<TabGroupId> {
        let mut ids: Vec<TabGroupId> = Vec::new();
        for group_id in self.entries.iter().filter_map(Tab::group_id) {
            if !ids.contains(&group_id) {
                ids.push(group_id);
            }
        }
        ids
    }

    /// Visual data of a group
    #[must_use]
    pub fn group_visual_data(&self, group_id: TabGroupId) -> Option<&TabGroupVisualData> {
        self.groups.get(group_id)
    }

    /// Returns true if the group is registered
    #[must_use]
    pub fn has_group(&self, group_id: TabGroupId) -> bool {
        self.groups.contains(group_id)
    }

    /// Number of registered groups
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ---------------------------------------------------------------------
    // Position helpers (comprehensive order)
    // ---------------------------------------------------------------------

    fn position(&self, tab_id: TabId) -> Option<usize> {
        self.entries.iter().position(|tab| tab.id() == tab_id)
    }

    fn is_live(&self, tab_id: TabId) -> bool {
        self.contains(tab_id) && !self.closures.is_pending(tab_id)
    }

    fn pinned_prefix_len(&self) -> usize {
        self.entries.iter().take_while(|tab| tab.is_pinned()).count()
    }

    /// Maps a live-view insertion point to a comprehensive insertion point.
    fn live_insertion_point(&self, index: usize) -> usize {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, tab)| !self.closures.is_pending(tab.id()))
            .nth(index)
            .map_or(self.entries.len(), |(pos, _)| pos)
    }

    /// First and last comprehensive position of a group's members.
    fn group_span(&self, group_id: TabGroupId) -> Option<(usize, usize)> {
        let first = self
            .entries
            .iter()
            .position(|tab| tab.group_id() == Some(group_id))?;
        let last = self
            .entries
            .iter()
            .rposition(|tab| tab.group_id() == Some(group_id))?;
        Some((first, last))
    }

    /// Adjusts an insertion point so inserting `tab` keeps the ordering
    /// invariants. `tab` must not be in `entries`.
    fn normalize_insertion(&self, tab: &Tab, pos: usize) -> usize {
        let pos = pos.min(self.entries.len());
        let pinned = self.pinned_prefix_len();
        let mut pos = if tab.is_pinned() {
            pos.min(pinned)
        } else {
            pos.max(pinned)
        };

        if let Some((first, last)) = tab.group_id().and_then(|g| self.group_span(g)) {
            return pos.clamp(first, last + 1);
        }

        // Never split a foreign group
        if pos > 0 && pos < self.entries.len() {
            let before = self.entries[pos - 1].group_id();
            let after = self.entries[pos].group_id();
            if let (Some(a), Some(b)) = (before, after)
                && a == b
                && tab.group_id() != Some(a)
                && let Some((_, last)) = self.group_span(a)
            {
                pos = last + 1;
            }
        }
        pos
    }

    /// Nearest live tab to the left of `pos`, else to the right, skipping
    /// `excluded`.
    fn neighbor_for(&self, pos: usize, excluded: &[TabId]) -> Option<TabId> {
        let eligible =
            |tab: &&Tab| !self.closures.is_pending(tab.id()) && !excluded.contains(&tab.id());
        self.entries[..pos]
            .iter()
            .rev()
            .find(eligible)
            .or_else(|| self.entries[(pos + 1).min(self.entries.len())..].iter().find(eligible))
            .map(Tab::id)
    }

    fn notify_moved(&self, tab_id: TabId, old_index: Option<usize>) {
        if let (Some(old), Some(new)) = (old_index, self.index_of(tab_id))
            && old != new
        {
            self.notify_mutation(|obs, model| obs.did_move_tab(model, tab_id, new, old));
        }
    }

    /// Removes a group from the registry once it has no member left.
    fn prune_group(&mut self, group_id: TabGroupId) -> bool {
        if self.entries.iter().any(|tab| tab.group_id() == Some(group_id)) {
            return false;
        }
        if self.groups.remove(group_id).is_none() {
            return false;
        }
        tracing::debug!(group = %group_id, mode = %self.mode, "Removed empty tab group");
        self.notify_mutation(|obs, model| obs.did_remove_tab_group(model, group_id));
        true
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    fn refresh_visibility(&mut self) {
        let shown = if self.active { self.selected } else { None };
        for tab in &mut self.entries {
            tab.set_hidden(Some(tab.id()) != shown);
        }
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
        self.refresh_visibility();
    }

    fn select(&mut self, tab_id: Option<TabId>, selection_type: TabSelectionType) {
        let last = self.selected;
        self.selected = tab_id;
        self.refresh_visibility();
        if let Some(id) = tab_id {
            let last_id = last.unwrap_or(TabId::INVALID);
            tracing::trace!(tab_id = %id, ?selection_type, "Tab selected");
            self.notify_mutation(|obs, model| obs.did_select_tab(model, id, selection_type, last_id));
        }
    }

    /// Selects the live tab at `index`.
    ///
    /// Out-of-range indices are ignored and return false.
    pub fn set_index(&mut self, index: usize, selection_type: TabSelectionType) -> bool {
        let Some(tab_id) = self.tab_at(index).map(Tab::id) else {
            return false;
        };
        self.select(Some(tab_id), selection_type);
        true
    }

    // ---------------------------------------------------------------------
    // Insertion and removal
    // ---------------------------------------------------------------------

    fn apply_requests(&mut self, requests: ModelRequests) {
        for request in requests.into_vec() {
            match request {
                ModelRequest::AddTab {
                    tab,
                    index,
                    launch_type,
                    creation_state,
                } => {
                    self.add_tab(tab, index, launch_type, creation_state);
                }
                ModelRequest::CloseTabs(params) => {
                    self.close_tabs(params);
                }
                ModelRequest::CancelTabClosure(tab_id) => {
                    self.cancel_tab_closure(tab_id);
                }
                ModelRequest::CommitAllTabClosures => self.commit_all_tab_closures(),
                ModelRequest::SetIndex(index, selection_type) => {
                    self.set_index(index, selection_type);
                }
            }
        }
    }

    /// Inserts a tab at the live-view `index` (`None` or past the end appends).
    ///
    /// The index is adjusted so that pinned tabs stay in the pinned prefix,
    /// group members stay contiguous and no foreign group is split. A pinned
    /// tab is never grouped. Observer requests issued from `will_add_tab` run
    /// before the insertion.
    ///
    /// Returns false without side effects if the id is invalid or already
    /// present, or if the tab belongs to the other browsing mode.
    pub fn add_tab(
        &mut self,
        tab: Tab,
        index: Option<usize>,
        launch_type: TabLaunchType,
        creation_state: TabCreationState,
    ) -> bool {
        let tab_id = tab.id();
        if !tab_id.is_valid() || tab.mode() != self.mode || self.contains(tab_id) {
            tracing::debug!(tab_id = %tab_id, mode = %self.mode, "Ignoring invalid tab insertion");
            return false;
        }

        let mut requests = ModelRequests::default();
        self.notify_mutation(|obs, model| obs.will_add_tab(model, &tab, launch_type, &mut requests));
        self.apply_requests(requests);
        if self.contains(tab_id) {
            return false;
        }

        let mut tab = tab;
        tab.set_launch_type(launch_type);
        tab.set_hidden(true);
        if tab.is_pinned() {
            tab.set_group_id(None);
        }
        if let Some(group_id) = tab.group_id() {
            self.groups.register(group_id);
        }

        let live_index = index.map_or_else(|| self.count(), |i| i.min(self.count()));
        let pos = self.normalize_insertion(&tab, self.live_insertion_point(live_index));
        self.entries.insert(pos, tab);
        tracing::debug!(
            tab_id = %tab_id,
            mode = %self.mode,
            position = pos,
            ?launch_type,
            "Tab added"
        );

        let mut requests = ModelRequests::default();
        self.notify_mutation(|obs, model| {
            obs.did_add_tab(model, tab_id, launch_type, creation_state, &mut requests);
        });

        let foreground = creation_state.is_foreground() && !launch_type.opens_in_background();
        if foreground || self.selected.is_none() {
            self.select(Some(tab_id), TabSelectionType::FromNew);
        }

        self.apply_requests(requests);
        true
    }

    /// Detaches a tab without an undoable closure and returns it.
    ///
    /// Used when a tab changes owner (for example moving to another window).
    /// The selection moves to a neighbor if the tab was selected.
    pub fn remove_tab(&mut self, tab_id: TabId) -> Option<Tab> {
        let pos = self.position(tab_id)?;
        let was_selected = self.selected == Some(tab_id);
        let replacement = if was_selected {
            self.neighbor_for(pos, &[])
        } else {
            None
        };

        let mut tab = self.entries.remove(pos);
        self.closures.resolve(tab_id);
        tab.set_hidden(true);
        if was_selected {
            self.selected = None;
        }
        tracing::debug!(tab_id = %tab_id, mode = %self.mode, "Tab detached");
        self.notify_mutation(|obs, model| obs.tab_removed(model, &tab));

        if let Some(group_id) = tab.group_id() {
            self.prune_group(group_id);
        }
        if was_selected {
            match replacement {
                Some(next) => self.select(Some(next), TabSelectionType::FromClose),
                None => self.refresh_visibility(),
            }
        }
        Some(tab)
    }

    // ---------------------------------------------------------------------
    // Closure
    // ---------------------------------------------------------------------

    /// Closes the live tabs matched by `params` and returns how many were
    /// closed.
    ///
    /// With `allow_undo` the tabs become pending closure and keep their slot;
    /// otherwise they are committed immediately.
    pub fn close_tabs(&mut self, params: ClosureParams) -> usize {
        let requested: Vec<TabId> = match &params.target {
            ClosureTarget::Tab(tab_id) => vec![*tab_id],
            ClosureTarget::Tabs(tab_ids) => tab_ids.clone(),
            ClosureTarget::Group(group_id) => self.tabs_in_group(*group_id),
            ClosureTarget::All => self.tabs().map(Tab::id).collect(),
        };
        let targets: Vec<TabId> = self
            .tabs()
            .map(Tab::id)
            .filter(|id| requested.contains(id))
            .collect();
        if targets.is_empty() {
            return 0;
        }

        for tab_id in &targets {
            if let Some(tab) = self.get_tab(*tab_id) {
                self.notify_closure(|obs, model| obs.will_close_tab(model, tab));
            }
        }

        // None: selection unaffected. Some(None): nothing left to select.
        let replacement = self
            .selected
            .filter(|id| targets.contains(id))
            .and_then(|id| self.position(id))
            .map(|pos| self.neighbor_for(pos, &targets));
        if replacement.is_some() {
            self.selected = None;
        }

        if params.allow_undo {
            self.closures.mark_pending(&targets);
            self.refresh_visibility();
            for tab_id in &targets {
                if let Some(tab) = self.get_tab(*tab_id) {
                    self.notify_closure(|obs, model| obs.tab_pending_closure(model, tab));
                }
            }
        } else {
            for tab_id in &targets {
                self.commit_entry(*tab_id);
            }
        }

        tracing::debug!(
            mode = %self.mode,
            closed = targets.len(),
            allow_undo = params.allow_undo,
            "Tabs closed"
        );

        match replacement {
            Some(Some(next)) => self.select(Some(next), TabSelectionType::FromClose),
            Some(None) => self.refresh_visibility(),
            None => {}
        }
        targets.len()
    }

    /// Reverts a pending closure; `TabId::INVALID` reverts all of them.
    ///
    /// Restored tabs regain their previous position. If nothing is selected
    /// the first restored tab becomes selected. Returns the number of
    /// restored tabs.
    pub fn cancel_tab_closure(&mut self, tab_id: TabId) -> usize {
        let restored: Vec<TabId> = if tab_id.is_valid() {
            if !self.closures.is_pending(tab_id) {
                return 0;
            }
            vec![tab_id]
        } else {
            self.entries
                .iter()
                .map(Tab::id)
                .filter(|id| self.closures.is_pending(*id))
                .collect()
        };

        for id in &restored {
            self.closures.resolve(*id);
        }
        self.refresh_visibility();
        for id in &restored {
            if let Some(tab) = self.get_tab(*id) {
                self.notify_closure(|obs, model| obs.tab_closure_undone(model, tab));
            }
        }
        if self.selected.is_none()
            && let Some(first) = restored.first()
        {
            self.select(Some(*first), TabSelectionType::FromUndo);
        }

        if !restored.is_empty() {
            tracing::debug!(mode = %self.mode, restored = restored.len(), "Tab closure undone");
        }
        restored.len()
    }

    fn commit_entry(&mut self, tab_id: TabId) -> bool {
        let Some(pos) = self.position(tab_id) else {
            return false;
        };
        self.closures.resolve(tab_id);
        if self.selected == Some(tab_id) {
            self.selected = None;
        }
        let tab = self.entries.remove(pos);
        self.notify_closure(|obs, model| obs.tab_closure_committed(model, &tab));

        if let Some(group_id) = tab.group_id() {
            self.prune_group(group_id);
        }
        if self.entries.is_empty() {
            self.notify_closure(|obs, model| obs.all_tabs_closure_committed(model));
        }
        true
    }

    /// Finalizes a pending closure. Returns false if the tab is not pending.
    pub fn commit_tab_closure(&mut self, tab_id: TabId) -> bool {
        if !self.closures.is_pending(tab_id) {
            return false;
        }
        self.commit_entry(tab_id)
    }

    /// Finalizes every pending closure.
    pub fn commit_all_tab_closures(&mut self) {
        let pending: Vec<TabId> = self
            .entries
            .iter()
            .map(Tab::id)
            .filter(|id| self.closures.is_pending(*id))
            .collect();
        for tab_id in pending {
            self.commit_entry(tab_id);
        }
    }

    // ---------------------------------------------------------------------
    // Reordering
    // ---------------------------------------------------------------------

    /// Moves a live tab to the live-view insertion point `new_index`.
    ///
    /// `new_index` is interpreted before the tab is taken out, so moving a
    /// tab one slot to the right means `index + 2`. Returns true if the tab
    /// changed position or left its group.
    pub fn move_tab(&mut self, tab_id: TabId, new_index: usize) -> bool {
        let Some(current) = self.index_of(tab_id) else {
            return false;
        };
        let target = new_index.min(self.count());
        if target == current || target == current + 1 {
            return false;
        }
        let Some(old_pos) = self.position(tab_id) else {
            return false;
        };

        let insertion = self.live_insertion_point(target);
        let mut tab = self.entries.remove(old_pos);
        let pos = if insertion > old_pos {
            insertion - 1
        } else {
            insertion
        };

        let left_group = match tab.group_id().and_then(|g| self.group_span(g).map(|s| (g, s))) {
            Some((group_id, (first, last))) if pos < first || pos > last + 1 => {
                tab.set_group_id(None);
                Some(group_id)
            }
            _ => None,
        };

        let pos = self.normalize_insertion(&tab, pos);
        self.entries.insert(pos, tab);

        if let Some(group_id) = left_group {
            self.notify_mutation(|obs, model| {
                obs.did_remove_tab_from_group(model, tab_id, group_id);
            });
        }
        let moved = self.index_of(tab_id) != Some(current);
        self.notify_moved(tab_id, Some(current));
        moved || left_group.is_some()
    }

    /// Moves a tab together with the rest of its group.
    ///
    /// Members keep their relative order. For an ungrouped tab this is
    /// [`Self::move_tab`].
    pub fn move_related_tabs(&mut self, tab_id: TabId, new_index: usize) -> bool {
        if !self.is_live(tab_id) {
            return false;
        }
        let Some(group_id) = self.get_tab(tab_id).and_then(Tab::group_id) else {
            return self.move_tab(tab_id, new_index);
        };
        let Some((first, last)) = self.group_span(group_id) else {
            return false;
        };

        let insertion = self.live_insertion_point(new_index.min(self.count()));
        if (first..=last + 1).contains(&insertion) {
            return false;
        }

        let members: Vec<(TabId, Option<usize>)> = self.entries[first..=last]
            .iter()
            .map(|tab| (tab.id(), self.index_of(tab.id())))
            .collect();
        let block: Vec<Tab> = self.entries.drain(first..=last).collect();
        let pos = if insertion > last {
            insertion - block.len()
        } else {
            insertion
        };
        let pos = self.normalize_insertion(&block[0], pos);
        for (offset, tab) in block.into_iter().enumerate() {
            self.entries.insert(pos + offset, tab);
        }

        tracing::debug!(group = %group_id, position = pos, "Tab group moved");
        for (member, old_index) in members {
            self.notify_moved(member, old_index);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Pinning
    // ---------------------------------------------------------------------

    /// Pins a live tab, moving it to the end of the pinned prefix and out of
    /// its group. Returns false if the tab is already pinned or not live.
    pub fn pin_tab(&mut self, tab_id: TabId) -> bool {
        self.set_pinned(tab_id, true)
    }

    /// Unpins a live tab, moving it to the start of the unpinned region.
    /// Returns false if the tab is not pinned or not live.
    pub fn unpin_tab(&mut self, tab_id: TabId) -> bool {
        self.set_pinned(tab_id, false)
    }

    fn set_pinned(&mut self, tab_id: TabId, pinned: bool) -> bool {
        if !self.is_live(tab_id) {
            return false;
        }
        let Some(pos) = self.position(tab_id) else {
            return false;
        };
        if self.entries[pos].is_pinned() == pinned {
            return false;
        }

        let old_index = self.index_of(tab_id);
        let mut tab = self.entries.remove(pos);
        let previous_group = tab.group_id();
        tab.set_pinned(pinned);
        tab.set_group_id(None);
        let target = self.pinned_prefix_len();
        self.entries.insert(target, tab);

        if let Some(group_id) = previous_group {
            self.notify_mutation(|obs, model| {
                obs.did_remove_tab_from_group(model, tab_id, group_id);
            });
            self.prune_group(group_id);
        }
        tracing::debug!(tab_id = %tab_id, pinned, "Pinned state changed");
        self.notify_mutation(|obs, model| obs.did_change_pinned_state(model, tab_id));
        self.notify_moved(tab_id, old_index);
        true
    }

    // ---------------------------------------------------------------------
    // Groups
    // ---------------------------------------------------------------------

    /// Merges `source` into the group of `dest`, creating a group if `dest`
    /// has none.
    ///
    /// The source tab is placed right after the last member. Returns the
    /// group id, or `None` for invalid, pending or pinned participants and
    /// for self-merges.
    pub fn merge_tabs_to_group(&mut self, source: TabId, dest: TabId) -> Option<TabGroupId> {
        if source == dest || !self.is_live(source) || !self.is_live(dest) {
            return None;
        }
        let (src_pinned, src_group) = self
            .get_tab(source)
            .map(|tab| (tab.is_pinned(), tab.group_id()))?;
        let (dst_pinned, dst_group) = self
            .get_tab(dest)
            .map(|tab| (tab.is_pinned(), tab.group_id()))?;
        if src_pinned || dst_pinned {
            return None;
        }
        if src_group.is_some() && src_group == dst_group {
            return src_group;
        }

        let old_index = self.index_of(source);
        let group_id = match dst_group {
            Some(group_id) => group_id,
            None => {
                let group_id = TabGroupId::new();
                self.groups.register(group_id);
                let pos = self.position(dest)?;
                self.entries[pos].set_group_id(Some(group_id));
                tracing::debug!(group = %group_id, tab_id = %dest, "Tab group created");
                self.notify_mutation(|obs, model| obs.did_merge_tab_to_group(model, dest, group_id));
                group_id
            }
        };

        let src_pos = self.position(source)?;
        let mut tab = self.entries.remove(src_pos);
        tab.set_group_id(Some(group_id));
        let insert_at = self
            .group_span(group_id)
            .map_or(self.entries.len(), |(_, last)| last + 1);
        self.entries.insert(insert_at, tab);

        if let Some(previous) = src_group {
            self.notify_mutation(|obs, model| {
                obs.did_remove_tab_from_group(model, source, previous);
            });
            self.prune_group(previous);
        }
        self.notify_mutation(|obs, model| obs.did_merge_tab_to_group(model, source, group_id));
        self.notify_moved(source, old_index);
        Some(group_id)
    }

    /// Merges each tab of `sources` into the group of `dest`, in order.
    pub fn merge_list_of_tabs_to_group(
        &mut self,
        sources: &[TabId],
        dest: TabId,
    ) -> Option<TabGroupId> {
        let mut group = None;
        for &source in sources {
            if let Some(group_id) = self.merge_tabs_to_group(source, dest) {
                group = Some(group_id);
            }
        }
        group
    }

    /// Removes a subset of tabs from their groups.
    ///
    /// Leaving tabs are placed just past their group, keeping their relative
    /// order. A group survives while it has members. `allow_dialog` is
    /// accepted for front-end parity and ignored. Returns the number of tabs
    /// that left a group.
    pub fn ungroup_tabs(&mut self, tab_ids: &[TabId], _allow_dialog: bool) -> usize {
        let mut leavers: Vec<(usize, TabId, TabGroupId)> = tab_ids
            .iter()
            .filter_map(|&id| {
                let pos = self.position(id)?;
                let group_id = self.entries[pos].group_id()?;
                Some((pos, id, group_id))
            })
            .collect();
        // Right-most first so each leaver lands ahead of the ones already out
        leavers.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        leavers.dedup_by_key(|leaver| leaver.1);

        for &(_, tab_id, group_id) in &leavers {
            let Some(pos) = self.position(tab_id) else {
                continue;
            };
            let old_index = self.index_of(tab_id);
            let mut tab = self.entries.remove(pos);
            tab.set_group_id(None);
            let insert_at = self.group_span(group_id).map_or(pos, |(_, last)| last + 1);
            self.entries.insert(insert_at, tab);

            self.notify_mutation(|obs, model| {
                obs.did_remove_tab_from_group(model, tab_id, group_id);
            });
            self.prune_group(group_id);
            self.notify_moved(tab_id, old_index);
        }
        leavers.len()
    }

    /// Dissolves a group in place. `allow_dialog` is ignored.
    pub fn ungroup_tab_group(&mut self, group_id: TabGroupId, _allow_dialog: bool) -> bool {
        if !self.groups.contains(group_id) {
            return false;
        }
        let mut members = Vec::new();
        for tab in &mut self.entries {
            if tab.group_id() == Some(group_id) {
                tab.set_group_id(None);
                members.push(tab.id());
            }
        }
        for tab_id in members {
            self.notify_mutation(|obs, model| {
                obs.did_remove_tab_from_group(model, tab_id, group_id);
            });
        }
        self.prune_group(group_id)
    }

    fn update_group_visual_data(
        &mut self,
        group_id: TabGroupId,
        update: impl FnOnce(&mut TabGroupVisualData),
    ) -> TabResult<()> {
        let data = self
            .groups
            .get_mut(group_id)
            .ok_or(TabError::GroupNotFound(group_id))?;
        update(data);
        self.notify_mutation(|obs, model| obs.did_change_group_visual_data(model, group_id));
        Ok(())
    }

    /// Sets a group's title.
    ///
    /// # Errors
    ///
    /// Returns `TabError::GroupNotFound` if the group is not registered.
    pub fn try_set_tab_group_title(
        &mut self,
        group_id: TabGroupId,
        title: impl Into<String>,
    ) -> TabResult<()> {
        let title = title.into();
        self.update_group_visual_data(group_id, |data| data.title = title)
    }

    /// Sets a group's color.
    ///
    /// # Errors
    ///
    /// Returns `TabError::GroupNotFound` if the group is not registered.
    pub fn try_set_tab_group_color(
        &mut self,
        group_id: TabGroupId,
        color: TabGroupColor,
    ) -> TabResult<()> {
        self.update_group_visual_data(group_id, |data| data.color = color)
    }

    /// Collapses or expands a group. Members are never removed.
    ///
    /// # Errors
    ///
    /// Returns `TabError::GroupNotFound` if the group is not registered.
    pub fn try_set_tab_group_collapsed(
        &mut self,
        group_id: TabGroupId,
        collapsed: bool,
    ) -> TabResult<()> {
        self.update_group_visual_data(group_id, |data| data.collapsed = collapsed)
    }

    /// Replaces a group's visual data.
    ///
    /// # Errors
    ///
    /// Returns `TabError::GroupNotFound` if the group is not registered.
    pub fn try_set_tab_group_visual_data(
        &mut self,
        group_id: TabGroupId,
        visual_data: TabGroupVisualData,
    ) -> TabResult<()> {
        self.update_group_visual_data(group_id, |data| *data = visual_data)
    }

    /// Sets a group's title.
    ///
    /// # Panics
    ///
    /// Panics if the group does not exist.
    pub fn set_tab_group_title(&mut self, group_id: TabGroupId, title: impl Into<String>) {
        if let Err(err) = self.try_set_tab_group_title(group_id, title) {
            panic!("set_tab_group_title: {err}");
        }
    }

    /// Sets a group's color.
    ///
    /// # Panics
    ///
    /// Panics if the group does not exist.
    pub fn set_tab_group_color(&mut self, group_id: TabGroupId, color: TabGroupColor) {
        if let Err(err) = self.try_set_tab_group_color(group_id, color) {
            panic!("set_tab_group_color: {err}");
        }
    }

    /// Collapses or expands a group.
    ///
    /// # Panics
    ///
    /// Panics if the group does not exist.
    pub fn set_tab_group_collapsed(&mut self, group_id: TabGroupId, collapsed: bool) {
        if let Err(err) = self.try_set_tab_group_collapsed(group_id, collapsed) {
            panic!("set_tab_group_collapsed: {err}");
        }
    }
}
