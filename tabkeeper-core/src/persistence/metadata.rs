//! Persisted metadata snapshot
//!
//! One JSON file per window records the order, pinning, grouping and
//! selection of the live tabs in both modes, plus group visual data. Tab
//! content lives in separate files (see [`super::tab_state`]).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, PersistenceResult};
use crate::model::{TabCollection, TabGroupVisualData, TabModelSelector};
use crate::tab::{InstanceId, ProfileMode, Tab, TabGroupId, TabId};

/// Current version of the metadata format
pub const METADATA_FORMAT_VERSION: u32 = 1;

/// One tab in a persisted collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    /// Tab id
    pub id: TabId,
    /// URL at save time
    pub url: String,
    /// Title at save time
    #[serde(default)]
    pub title: String,
    /// Whether the tab is pinned
    #[serde(default)]
    pub pinned: bool,
    /// Group membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<TabGroupId>,
}

impl From<&Tab> for TabEntry {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id(),
            url: tab.url().to_string(),
            title: tab.title().to_string(),
            pinned: tab.is_pinned(),
            group_id: tab.group_id(),
        }
    }
}

/// Visual data of a persisted group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Group id
    pub id: TabGroupId,
    /// Title, color and collapsed state
    #[serde(flatten)]
    pub visual_data: TabGroupVisualData,
}

/// Persisted state of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Browsing mode
    pub mode: ProfileMode,
    /// Live tabs in order
    #[serde(default)]
    pub tabs: Vec<TabEntry>,
    /// Selected live-view index
    #[serde(default)]
    pub selected_index: Option<usize>,
    /// Groups with at least one live member
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

impl CollectionMetadata {
    /// An empty collection of `mode`
    #[must_use]
    pub const fn empty(mode: ProfileMode) -> Self {
        Self {
            mode,
            tabs: Vec::new(),
            selected_index: None,
            groups: Vec::new(),
        }
    }

    /// Snapshots the live tabs of a collection. Pending closures are not
    /// persisted.
    #[must_use]
    pub fn from_collection(model: &TabCollection) -> Self {
        let groups = model
            .group_ids()
            .into_iter()
            .filter(|id| !model.tabs_in_group(*id).is_empty())
            .filter_map(|id| {
                model.group_visual_data(id).map(|data| GroupEntry {
                    id,
                    visual_data: data.clone(),
                })
            })
            .collect();
        Self {
            mode: model.mode(),
            tabs: model.tabs().map(TabEntry::from).collect(),
            selected_index: model.selected_index(),
            groups,
        }
    }
}

/// Metadata snapshot of one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMetadata {
    /// Format version
    pub version: u32,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
    /// Window index
    pub window: InstanceId,
    /// Whether the incognito collection was current
    #[serde(default)]
    pub incognito_selected: bool,
    /// Regular collection
    pub regular: CollectionMetadata,
    /// Incognito collection
    pub incognito: CollectionMetadata,
}

impl PersistedMetadata {
    /// An empty snapshot for a window
    #[must_use]
    pub fn new(window: InstanceId) -> Self {
        Self {
            version: METADATA_FORMAT_VERSION,
            saved_at: Utc::now(),
            window,
            incognito_selected: false,
            regular: CollectionMetadata::empty(ProfileMode::Regular),
            incognito: CollectionMetadata::empty(ProfileMode::Incognito),
        }
    }

    /// Snapshots both collections of a selector. An uninitialized selector
    /// yields an empty snapshot.
    #[must_use]
    pub fn from_selector(window: InstanceId, selector: &TabModelSelector) -> Self {
        let mut metadata = Self::new(window);
        metadata.incognito_selected = selector.is_incognito_selected();
        if let Ok(model) = selector.model(false) {
            metadata.regular = CollectionMetadata::from_collection(model);
        }
        if let Ok(model) = selector.model(true) {
            metadata.incognito = CollectionMetadata::from_collection(model);
        }
        metadata
    }

    /// The collection snapshot of a mode
    #[must_use]
    pub const fn collection(&self, mode: ProfileMode) -> &CollectionMetadata {
        match mode {
            ProfileMode::Regular => &self.regular,
            ProfileMode::Incognito => &self.incognito,
        }
    }

    /// The collection snapshot of a mode, mutably
    pub fn collection_mut(&mut self, mode: ProfileMode) -> &mut CollectionMetadata {
        match mode {
            ProfileMode::Regular => &mut self.regular,
            ProfileMode::Incognito => &mut self.incognito,
        }
    }

    /// Number of tabs in both modes
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.regular.tabs.len() + self.incognito.tabs.len()
    }

    /// All referenced tabs as `(id, is_incognito)`, regular first
    #[must_use]
    pub fn referenced_tabs(&self) -> Vec<(TabId, bool)> {
        self.regular
            .tabs
            .iter()
            .map(|t| (t.id, false))
            .chain(self.incognito.tabs.iter().map(|t| (t.id, true)))
            .collect()
    }

    /// Serializes to pretty JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses and version-checks a snapshot
    ///
    /// # Errors
    /// Returns an error if parsing fails or the version is not supported
    pub fn from_json(json: &str, path: &Path) -> PersistenceResult<Self> {
        let metadata: Self =
            serde_json::from_str(json).map_err(|source| PersistenceError::Deserialization {
                path: path.to_path_buf(),
                source,
            })?;
        if metadata.version != METADATA_FORMAT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: METADATA_FORMAT_VERSION,
                actual: metadata.version,
            });
        }
        Ok(metadata)
    }

    /// Writes the snapshot through a temporary file and a rename
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn save_to_file(&self, path: &Path) -> PersistenceResult<()> {
        let json = self.to_json().map_err(PersistenceError::Serialization)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Loads a snapshot from a file
    ///
    /// # Errors
    /// Returns an error if reading or parsing fails
    pub fn load_from_file(path: &Path) -> PersistenceResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, path)
    }
}
