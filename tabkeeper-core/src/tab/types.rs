//! Core type definitions for the tab model
//!
//! This module contains the identifier newtypes and the small enums shared by
//! collections, creators and persistence.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tab.
///
/// Ids are allocated by a [`super::TabIdAllocator`] shared by every window
/// and both browsing modes, so an id is unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl TabId {
    /// Sentinel for "no tab". Passed to `cancel_tab_closure` it means "all".
    pub const INVALID: Self = Self(-1);

    /// Creates a tab id from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns true unless this is a negative sentinel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tab({})", self.0)
    }
}

/// Identifier for a tab group: a random 128-bit token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabGroupId(pub Uuid);

impl TabGroupId {
    /// Creates a new random group token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a group id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TabGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({})", self.0)
    }
}

/// Index of a window (instance). Also selects the metadata file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Creates an instance id from a window index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the window index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({})", self.0)
    }
}

/// Browsing mode a tab or collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    /// Regular browsing
    #[default]
    Regular,
    /// Incognito browsing
    Incognito,
}

impl ProfileMode {
    /// Maps the `incognito` flag used throughout the public API.
    #[must_use]
    pub const fn from_incognito(incognito: bool) -> Self {
        if incognito {
            Self::Incognito
        } else {
            Self::Regular
        }
    }

    /// Returns true for [`ProfileMode::Incognito`].
    #[must_use]
    pub const fn is_incognito(self) -> bool {
        matches!(self, Self::Incognito)
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Incognito => write!(f, "incognito"),
        }
    }
}

/// How a tab came to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabLaunchType {
    /// Opened from a link in another tab
    FromLink,
    /// Opened by an external application
    FromExternalApp,
    /// Opened from browser chrome (new-tab button, menu)
    FromBrowserUi,
    /// Opened in the background via long press
    FromLongPressBackground,
    /// Restored from persisted state
    FromRestore,
    /// Moved in from another window
    FromReparenting,
    /// Opened from the tab group UI
    FromTabGroupUi,
    /// Recreated from a synced or archived session
    FromSync,
    /// Launch type not specified
    #[default]
    Unset,
}

impl TabLaunchType {
    /// Launch types that never take the selection away from the current tab.
    #[must_use]
    pub const fn opens_in_background(self) -> bool {
        matches!(
            self,
            Self::FromLongPressBackground | Self::FromRestore | Self::FromSync
        )
    }
}

/// State a tab is in when it is added to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabCreationState {
    /// Live and shown immediately
    #[default]
    LiveInForeground,
    /// Live but not selected
    LiveInBackground,
    /// Frozen, created while restoring persisted state
    FrozenOnRestore,
    /// Frozen, content loaded on first selection
    FrozenForLazyLoad,
}

impl TabCreationState {
    /// Returns true when the added tab should take the selection.
    #[must_use]
    pub const fn is_foreground(self) -> bool {
        matches!(self, Self::LiveInForeground)
    }

    /// Returns true for tabs recreated from persisted state.
    #[must_use]
    pub const fn is_restore(self) -> bool {
        matches!(self, Self::FrozenOnRestore)
    }
}

/// Why the selection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabSelectionType {
    /// The user picked the tab
    FromUser,
    /// A new tab was opened in the foreground
    FromNew,
    /// The previously selected tab was closed
    FromClose,
    /// The collection is being torn down
    FromExit,
    /// A closure was undone
    FromUndo,
}

/// Color of a tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabGroupColor {
    /// Grey
    #[default]
    Grey,
    /// Blue
    Blue,
    /// Red
    Red,
    /// Yellow
    Yellow,
    /// Green
    Green,
    /// Pink
    Pink,
    /// Purple
    Purple,
    /// Cyan
    Cyan,
    /// Orange
    Orange,
}

impl TabGroupColor {
    /// Palette order used when assigning default colors to new groups.
    pub const PALETTE: [Self; 9] = [
        Self::Grey,
        Self::Blue,
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Pink,
        Self::Purple,
        Self::Cyan,
        Self::Orange,
    ];

    /// Returns the palette color at `index`, wrapping around.
    #[must_use]
    pub const fn from_palette_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    /// Returns the RGB tuple for this color.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Grey => (0x5f, 0x63, 0x68),
            Self::Blue => (0x1a, 0x73, 0xe8),
            Self::Red => (0xd9, 0x30, 0x25),
            Self::Yellow => (0xf9, 0xab, 0x00),
            Self::Green => (0x18, 0x80, 0x38),
            Self::Pink => (0xd0, 0x18, 0x84),
            Self::Purple => (0xa1, 0x42, 0xf4),
            Self::Cyan => (0x00, 0x7b, 0x83),
            Self::Orange => (0xfa, 0x90, 0x3e),
        }
    }
}

impl fmt::Display for TabGroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grey => "grey",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::Orange => "orange",
        };
        f.write_str(name)
    }
}
