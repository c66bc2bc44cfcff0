//! Per-tab content files

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::layout::StateLayout;
use crate::error::{PersistenceError, PersistenceResult};
use crate::tab::{Tab, TabId};

/// Current version of the tab file format
pub const TAB_STATE_FORMAT_VERSION: u32 = 1;

/// Contents of one tab file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabState {
    /// Format version
    pub version: u32,
    /// URL at save time
    pub url: String,
    /// Title at save time
    #[serde(default)]
    pub title: String,
    /// When the file was written
    pub saved_at: DateTime<Utc>,
    /// Whether the tab is incognito
    #[serde(default)]
    pub incognito: bool,
    /// Opaque content blob, hex encoded on disk
    #[serde(default, with = "hex_bytes")]
    pub content: Vec<u8>,
}

impl TabState {
    /// Captures the persistable state of a tab
    #[must_use]
    pub fn from_tab(tab: &Tab) -> Self {
        Self {
            version: TAB_STATE_FORMAT_VERSION,
            url: tab.url().to_string(),
            title: tab.title().to_string(),
            saved_at: Utc::now(),
            incognito: tab.is_incognito(),
            content: tab.content().to_vec(),
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Reads and writes tab files below a [`StateLayout`]
#[derive(Debug, Clone)]
pub struct TabStateStore {
    layout: StateLayout,
}

impl TabStateStore {
    /// Creates a store for a layout
    #[must_use]
    pub const fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    /// The layout this store writes to
    #[must_use]
    pub const fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Path of a tab file
    #[must_use]
    pub fn path(&self, tab_id: TabId, incognito: bool) -> PathBuf {
        self.layout.tab_file_path(tab_id, incognito)
    }

    /// Writes a tab file through a temporary file and a rename
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn write(&self, tab_id: TabId, state: &TabState) -> PersistenceResult<()> {
        let json = serde_json::to_string(state).map_err(PersistenceError::Serialization)?;
        std::fs::create_dir_all(self.layout.state_dir())?;
        let path = self.path(tab_id, state.incognito);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        tracing::trace!(tab_id = %tab_id, path = %path.display(), "Tab state written");
        Ok(())
    }

    /// Reads a tab file; a missing file is `None`
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn read(&self, tab_id: TabId, incognito: bool) -> PersistenceResult<Option<TabState>> {
        let path = self.path(tab_id, incognito);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state: TabState = serde_json::from_str(&json)
            .map_err(|source| PersistenceError::Deserialization { path, source })?;
        if state.version != TAB_STATE_FORMAT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: TAB_STATE_FORMAT_VERSION,
                actual: state.version,
            });
        }
        Ok(Some(state))
    }

    /// Deletes a tab file; returns whether it existed
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed
    pub fn delete(&self, tab_id: TabId, incognito: bool) -> PersistenceResult<bool> {
        match std::fs::remove_file(self.path(tab_id, incognito)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a tab file exists
    #[must_use]
    pub fn exists(&self, tab_id: TabId, incognito: bool) -> bool {
        self.path(tab_id, incognito).is_file()
    }

    /// All tab files as `(id, is_incognito)`
    ///
    /// # Errors
    /// Returns an error if the state directory cannot be read
    pub fn list(&self) -> PersistenceResult<Vec<(TabId, bool)>> {
        Ok(self.layout.list_tab_files()?)
    }
}
