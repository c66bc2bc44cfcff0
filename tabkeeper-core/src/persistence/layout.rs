//! On-disk layout of tab state
//!
//! ```text
//! <base>/
//!   migration.json          legacy migration record
//!   tab_state               legacy shared metadata file
//!   tab<id>                 legacy tab files
//!   0/                      state directory
//!     tab_state<window>     metadata, one per window
//!     tab<id>               regular tab content
//!     incognito_tab<id>     incognito tab content
//! ```

use std::io;
use std::path::{Path, PathBuf};

use crate::tab::{InstanceId, TabId};

/// Name of the state directory below the base directory
pub const STATE_DIR_INDEX: u32 = 0;

/// Prefix of metadata file names; the legacy shared file has no suffix
pub const METADATA_FILE_PREFIX: &str = "tab_state";

/// Prefix of regular tab content files
pub const TAB_FILE_PREFIX: &str = "tab";

/// Prefix of incognito tab content files
pub const INCOGNITO_TAB_FILE_PREFIX: &str = "incognito_tab";

/// File recording that the legacy migration has run
pub const MIGRATION_RECORD_FILE: &str = "migration.json";

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Path and name conventions rooted at a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    base_dir: PathBuf,
}

impl StateLayout {
    /// Creates a layout rooted at `base_dir`
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The base directory
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The state directory holding metadata and tab files
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.base_dir.join(STATE_DIR_INDEX.to_string())
    }

    /// Metadata file of a window
    #[must_use]
    pub fn metadata_path(&self, window: InstanceId) -> PathBuf {
        self.state_dir().join(Self::metadata_file_name(window))
    }

    /// Metadata file name of a window
    #[must_use]
    pub fn metadata_file_name(window: InstanceId) -> String {
        format!("{METADATA_FILE_PREFIX}{}", window.index())
    }

    /// Content file name of a tab
    #[must_use]
    pub fn tab_file_name(tab_id: TabId, incognito: bool) -> String {
        let prefix = if incognito {
            INCOGNITO_TAB_FILE_PREFIX
        } else {
            TAB_FILE_PREFIX
        };
        format!("{prefix}{}", tab_id.get())
    }

    /// Content file of a tab
    #[must_use]
    pub fn tab_file_path(&self, tab_id: TabId, incognito: bool) -> PathBuf {
        self.state_dir().join(Self::tab_file_name(tab_id, incognito))
    }

    /// Legacy shared metadata file
    #[must_use]
    pub fn legacy_metadata_path(&self) -> PathBuf {
        self.base_dir.join(METADATA_FILE_PREFIX)
    }

    /// Legacy migration record
    #[must_use]
    pub fn migration_record_path(&self) -> PathBuf {
        self.base_dir.join(MIGRATION_RECORD_FILE)
    }

    /// Parses `tab<id>` / `incognito_tab<id>` into `(id, is_incognito)`
    #[must_use]
    pub fn parse_tab_file_name(name: &str) -> Option<(TabId, bool)> {
        if let Some(rest) = name.strip_prefix(INCOGNITO_TAB_FILE_PREFIX) {
            return parse_digits::<i32>(rest).map(|id| (TabId::new(id), true));
        }
        name.strip_prefix(TAB_FILE_PREFIX)
            .and_then(parse_digits::<i32>)
            .map(|id| (TabId::new(id), false))
    }

    /// Parses `tab_state<window>` into the window index
    #[must_use]
    pub fn parse_metadata_file_name(name: &str) -> Option<InstanceId> {
        name.strip_prefix(METADATA_FILE_PREFIX)
            .and_then(parse_digits::<u32>)
            .map(InstanceId::new)
    }

    /// Metadata files present in the state directory, by window index.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be read.
    pub fn list_metadata_files(&self) -> io::Result<Vec<(InstanceId, PathBuf)>> {
        let mut files: Vec<_> = list_file_names(&self.state_dir())?
            .into_iter()
            .filter_map(|(name, path)| Self::parse_metadata_file_name(&name).map(|w| (w, path)))
            .collect();
        files.sort_by_key(|(window, _)| *window);
        Ok(files)
    }

    /// Tab content files present in the state directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be read.
    pub fn list_tab_files(&self) -> io::Result<Vec<(TabId, bool)>> {
        let mut files: Vec<_> = list_file_names(&self.state_dir())?
            .into_iter()
            .filter_map(|(name, _)| Self::parse_tab_file_name(&name))
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Regular files in `dir` as `(name, path)`; a missing directory is empty.
pub(crate) fn list_file_names(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push((name.to_string(), entry.path()));
        }
    }
    Ok(files)
}
