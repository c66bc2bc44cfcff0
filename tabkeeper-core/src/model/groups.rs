//! Tab group registry
//!
//! The registry stores visual data for every group that currently has at
//! least one member in a collection. Membership itself lives on the tabs;
//! the owning [`super::TabCollection`] prunes a group from the registry when
//! its last member is committed, detached or ungrouped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tab::{TabGroupColor, TabGroupId};

/// Title, color and collapsed state of a tab group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabGroupVisualData {
    /// Group title, empty when unnamed
    #[serde(default)]
    pub title: String,
    /// Group color
    #[serde(default)]
    pub color: TabGroupColor,
    /// Whether the group is collapsed in the strip
    #[serde(default)]
    pub collapsed: bool,
}

impl TabGroupVisualData {
    /// Creates visual data with the given color and no title.
    #[must_use]
    pub fn with_color(color: TabGroupColor) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

/// Visual data for the groups of one collection.
///
/// New groups receive a default color from the palette, rotating so that
/// consecutively created groups are visually distinct.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<TabGroupId, TabGroupVisualData>,
    /// Next palette slot to assign (wraps around)
    next_color: usize,
}

impl GroupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group with a default palette color.
    ///
    /// Returns false if the group is already known.
    pub fn register(&mut self, group_id: TabGroupId) -> bool {
        if self.groups.contains_key(&group_id) {
            return false;
        }
        let color = TabGroupColor::from_palette_index(self.next_color);
        self.next_color = self.next_color.wrapping_add(1);
        self.groups
            .insert(group_id, TabGroupVisualData::with_color(color));
        true
    }

    /// Returns true if the group is registered.
    #[must_use]
    pub fn contains(&self, group_id: TabGroupId) -> bool {
        self.groups.contains_key(&group_id)
    }

    /// Returns the visual data for a group.
    #[must_use]
    pub fn get(&self, group_id: TabGroupId) -> Option<&TabGroupVisualData> {
        self.groups.get(&group_id)
    }

    pub(crate) fn get_mut(&mut self, group_id: TabGroupId) -> Option<&mut TabGroupVisualData> {
        self.groups.get_mut(&group_id)
    }

    /// Removes a group, returning its visual data.
    pub fn remove(&mut self, group_id: TabGroupId) -> Option<TabGroupVisualData> {
        self.groups.remove(&group_id)
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
