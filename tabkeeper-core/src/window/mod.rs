//! Multi-window context
//!
//! [`TabWindowManager`] owns one [`TabModelSelector`] per window and moves
//! tabs and tab groups between them. It is constructed explicitly and passed
//! to whoever needs it; all windows share one [`TabIdAllocator`].

use std::collections::BTreeMap;

use crate::error::{TabError, TabResult};
use crate::model::TabModelSelector;
use crate::tab::{
    InstanceId, TabCreationState, TabGroupId, TabId, TabIdAllocator, TabLaunchType,
    TabSelectionType,
};

/// Default maximum number of simultaneously open windows
pub const DEFAULT_MAX_WINDOWS: usize = 5;

/// Owns the selectors of all open windows
#[derive(Debug)]
pub struct TabWindowManager {
    allocator: TabIdAllocator,
    windows: BTreeMap<InstanceId, TabModelSelector>,
    max_windows: usize,
}

impl TabWindowManager {
    /// Creates a manager allowing up to `max_windows` windows.
    #[must_use]
    pub fn new(allocator: TabIdAllocator, max_windows: usize) -> Self {
        Self {
            allocator,
            windows: BTreeMap::new(),
            max_windows: max_windows.max(1),
        }
    }

    /// Returns the shared id allocator
    #[must_use]
    pub const fn allocator(&self) -> &TabIdAllocator {
        &self.allocator
    }

    /// Opens a window, at `requested` or at the lowest free index.
    ///
    /// # Errors
    ///
    /// Returns `TabError::WindowIndexInUse` if `requested` is taken and
    /// `TabError::WindowLimitReached` if no more windows may be opened.
    pub fn request_selector(&mut self, requested: Option<InstanceId>) -> TabResult<InstanceId> {
        if let Some(id) = requested
            && self.windows.contains_key(&id)
        {
            return Err(TabError::WindowIndexInUse(id));
        }
        if self.windows.len() >= self.max_windows {
            return Err(TabError::WindowLimitReached(self.max_windows));
        }

        let id = requested.unwrap_or_else(|| {
            let open = self.windows.len() as u32;
            (0..=open)
                .map(InstanceId::new)
                .find(|candidate| !self.windows.contains_key(candidate))
                .unwrap_or(InstanceId::new(open))
        });
        self.windows
            .insert(id, TabModelSelector::new(self.allocator.clone()));
        tracing::debug!(window = %id, "Window opened");
        Ok(id)
    }

    /// Returns the selector of a window
    #[must_use]
    pub fn selector(&self, window: InstanceId) -> Option<&TabModelSelector> {
        self.windows.get(&window)
    }

    /// Returns the selector of a window, mutably
    pub fn selector_mut(&mut self, window: InstanceId) -> Option<&mut TabModelSelector> {
        self.windows.get_mut(&window)
    }

    /// Closes a window and hands its selector back to the caller.
    pub fn remove_window(&mut self, window: InstanceId) -> Option<TabModelSelector> {
        let removed = self.windows.remove(&window);
        if removed.is_some() {
            tracing::debug!(window = %window, "Window closed");
        }
        removed
    }

    /// Indices of the open windows, ascending
    #[must_use]
    pub fn window_ids(&self) -> Vec<InstanceId> {
        self.windows.keys().copied().collect()
    }

    /// Number of open windows
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Finds the window holding a tab
    #[must_use]
    pub fn find_tab(&self, tab_id: TabId) -> Option<InstanceId> {
        self.windows
            .iter()
            .find(|(_, selector)| selector.get_tab_by_id(tab_id).is_some())
            .map(|(id, _)| *id)
    }

    /// Moves a live tab into `dest` at live-view `index` and selects it there.
    ///
    /// The tab leaves its group; it keeps its id and pinned state.
    ///
    /// # Errors
    ///
    /// Returns `TabError::TabNotFound` if no window holds the tab as a live
    /// tab, and `TabError::WindowNotFound` if `dest` is not open.
    pub fn move_tab_to_window(
        &mut self,
        tab_id: TabId,
        dest: InstanceId,
        index: Option<usize>,
    ) -> TabResult<()> {
        if !self.windows.contains_key(&dest) {
            return Err(TabError::WindowNotFound(dest));
        }
        let source = self.find_tab(tab_id).ok_or(TabError::TabNotFound(tab_id))?;
        let source_selector = self
            .windows
            .get_mut(&source)
            .ok_or(TabError::WindowNotFound(source))?;
        let incognito = source_selector
            .get_tab_by_id(tab_id)
            .map(crate::tab::Tab::is_incognito)
            .ok_or(TabError::TabNotFound(tab_id))?;
        let source_model = source_selector.model_mut(incognito)?;
        if source_model.is_pending_closure(tab_id) {
            return Err(TabError::TabNotFound(tab_id));
        }
        let tab = source_model
            .remove_tab(tab_id)
            .ok_or(TabError::TabNotFound(tab_id))?
            .in_group(None);

        let dest_model = self
            .windows
            .get_mut(&dest)
            .ok_or(TabError::WindowNotFound(dest))?
            .model_mut(incognito)?;
        dest_model.add_tab(
            tab,
            index,
            TabLaunchType::FromReparenting,
            TabCreationState::LiveInForeground,
        );
        tracing::info!(tab_id = %tab_id, from = %source, to = %dest, "Tab moved to window");
        Ok(())
    }

    /// Moves the live members of a group from `source` to `dest`, preserving
    /// order and visual data.
    ///
    /// Pending closures of the group are committed in the source window
    /// first. The first moved tab becomes selected in `dest`. Returns the
    /// number of moved tabs.
    ///
    /// # Errors
    ///
    /// Returns `TabError::WindowNotFound` for a missing window and
    /// `TabError::GroupNotFound` if `source` has no such group.
    pub fn move_tab_group_to_window(
        &mut self,
        group_id: TabGroupId,
        source: InstanceId,
        dest: InstanceId,
        index: Option<usize>,
    ) -> TabResult<usize> {
        if !self.windows.contains_key(&dest) {
            return Err(TabError::WindowNotFound(dest));
        }
        let source_selector = self
            .windows
            .get_mut(&source)
            .ok_or(TabError::WindowNotFound(source))?;
        let incognito = if source_selector.model(false)?.has_group(group_id) {
            false
        } else if source_selector.model(true)?.has_group(group_id) {
            true
        } else {
            return Err(TabError::GroupNotFound(group_id));
        };

        let source_model = source_selector.model_mut(incognito)?;
        let visual_data = source_model
            .group_visual_data(group_id)
            .cloned()
            .ok_or(TabError::GroupNotFound(group_id))?;
        let pending: Vec<TabId> = source_model
            .comprehensive_tabs()
            .filter(|tab| tab.group_id() == Some(group_id))
            .map(crate::tab::Tab::id)
            .filter(|id| source_model.is_pending_closure(*id))
            .collect();
        for tab_id in pending {
            source_model.commit_tab_closure(tab_id);
        }
        let tabs: Vec<_> = source_model
            .tabs_in_group(group_id)
            .into_iter()
            .filter_map(|id| source_model.remove_tab(id))
            .collect();

        let dest_model = self
            .windows
            .get_mut(&dest)
            .ok_or(TabError::WindowNotFound(dest))?
            .model_mut(incognito)?;
        let moved = tabs.len();
        let first = tabs.first().map(crate::tab::Tab::id);
        for (i, tab) in tabs.into_iter().enumerate() {
            dest_model.add_tab(
                tab.in_group(Some(group_id)),
                if i == 0 { index } else { None },
                TabLaunchType::FromReparenting,
                TabCreationState::LiveInBackground,
            );
        }
        if moved > 0 {
            dest_model.try_set_tab_group_visual_data(group_id, visual_data)?;
        }
        if let Some(index) = first.and_then(|id| dest_model.index_of(id)) {
            dest_model.set_index(index, TabSelectionType::FromUser);
        }

        tracing::info!(group = %group_id, from = %source, to = %dest, moved, "Tab group moved to window");
        Ok(moved)
    }
}
