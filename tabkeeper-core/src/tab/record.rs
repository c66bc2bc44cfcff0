//! The tab record held by collections

use chrono::{DateTime, Utc};

use super::types::{ProfileMode, TabGroupId, TabId, TabLaunchType};

/// A single browsing session entry.
///
/// Structural fields (pinning, group membership, visibility) are owned by
/// the collection holding the tab and can only be changed through it, which
/// keeps ordering and group invariants in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    id: TabId,
    mode: ProfileMode,
    url: String,
    title: String,
    is_pinned: bool,
    group_id: Option<TabGroupId>,
    hidden: bool,
    launch_type: TabLaunchType,
    /// Opaque content snapshot (navigation history, scroll state, ...)
    content: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl Tab {
    /// Creates a new tab record.
    #[must_use]
    pub fn new(id: TabId, mode: ProfileMode, url: impl Into<String>) -> Self {
        Self {
            id,
            mode,
            url: url.into(),
            title: String::new(),
            is_pinned: false,
            group_id: None,
            hidden: true,
            launch_type: TabLaunchType::Unset,
            content: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Sets the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the opaque content snapshot
    #[must_use]
    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = content;
        self
    }

    /// Marks the tab as pinned before it is added
    #[must_use]
    pub const fn pinned(mut self, pinned: bool) -> Self {
        self.is_pinned = pinned;
        self
    }

    /// Places the tab in a group before it is added
    #[must_use]
    pub const fn in_group(mut self, group_id: Option<TabGroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    /// Records how the tab was launched
    #[must_use]
    pub const fn with_launch_type(mut self, launch_type: TabLaunchType) -> Self {
        self.launch_type = launch_type;
        self
    }

    /// Returns the tab id
    #[must_use]
    pub const fn id(&self) -> TabId {
        self.id
    }

    /// Returns the browsing mode
    #[must_use]
    pub const fn mode(&self) -> ProfileMode {
        self.mode
    }

    /// Returns true for incognito tabs
    #[must_use]
    pub const fn is_incognito(&self) -> bool {
        self.mode.is_incognito()
    }

    /// Returns the current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the tab is pinned
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    /// Returns the group the tab belongs to
    #[must_use]
    pub const fn group_id(&self) -> Option<TabGroupId> {
        self.group_id
    }

    /// Returns whether the tab is currently hidden
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns the launch type
    #[must_use]
    pub const fn launch_type(&self) -> TabLaunchType {
        self.launch_type
    }

    /// Returns the opaque content snapshot
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the creation timestamp
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Updates the URL after a navigation
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Updates the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) const fn set_pinned(&mut self, pinned: bool) {
        self.is_pinned = pinned;
    }

    pub(crate) const fn set_group_id(&mut self, group_id: Option<TabGroupId>) {
        self.group_id = group_id;
    }

    pub(crate) const fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) const fn set_launch_type(&mut self, launch_type: TabLaunchType) {
        self.launch_type = launch_type;
    }
}
