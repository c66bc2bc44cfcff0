//! Deferred tab closure bookkeeping
//!
//! A tab moves `Live -> PendingClosure -> {Committed | Live}`. Pending tabs
//! keep their slot in the collection's comprehensive order, so cancelling a
//! closure puts the tab back exactly where it was.

use std::collections::HashSet;

use crate::tab::{TabGroupId, TabId};

/// Which tabs a closure request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureTarget {
    /// A single tab
    Tab(TabId),
    /// A subset of tabs
    Tabs(Vec<TabId>),
    /// Every member of a group
    Group(TabGroupId),
    /// Every live tab
    All,
}

/// Parameters of a closure request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureParams {
    /// Tabs to close
    pub target: ClosureTarget,
    /// Whether the closure can be undone
    pub allow_undo: bool,
}

impl ClosureParams {
    /// Closes a single tab.
    #[must_use]
    pub const fn tab(tab_id: TabId, allow_undo: bool) -> Self {
        Self {
            target: ClosureTarget::Tab(tab_id),
            allow_undo,
        }
    }

    /// Closes a subset of tabs.
    #[must_use]
    pub const fn tabs(tab_ids: Vec<TabId>, allow_undo: bool) -> Self {
        Self {
            target: ClosureTarget::Tabs(tab_ids),
            allow_undo,
        }
    }

    /// Closes every member of a group.
    #[must_use]
    pub const fn group(group_id: TabGroupId, allow_undo: bool) -> Self {
        Self {
            target: ClosureTarget::Group(group_id),
            allow_undo,
        }
    }

    /// Closes every live tab.
    #[must_use]
    pub const fn all(allow_undo: bool) -> Self {
        Self {
            target: ClosureTarget::All,
            allow_undo,
        }
    }
}

/// Tracks the tabs of one collection that are pending closure.
#[derive(Debug, Default)]
pub struct ClosureTracker {
    pending: HashSet<TabId>,
}

impl ClosureTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks tabs as pending closure.
    pub fn mark_pending(&mut self, tab_ids: &[TabId]) {
        self.pending.extend(tab_ids.iter().copied());
    }

    /// Returns true if the tab is pending closure.
    #[must_use]
    pub fn is_pending(&self, tab_id: TabId) -> bool {
        self.pending.contains(&tab_id)
    }

    /// Takes a tab out of the pending set, returning whether it was pending.
    ///
    /// Used both when a closure is cancelled and when it is committed.
    pub fn resolve(&mut self, tab_id: TabId) -> bool {
        self.pending.remove(&tab_id)
    }

    /// Returns the number of pending tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no tab is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
