//! Tab creators
//!
//! A [`TabCreator`] turns a URL into a tab in a collection. The selector
//! holds one creator per browsing mode.

use super::collection::TabCollection;
use crate::tab::{Tab, TabCreationState, TabId, TabIdAllocator, TabLaunchType};

/// What to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabCreationRequest {
    /// URL to open
    pub url: String,
    /// Initial title
    pub title: Option<String>,
    /// How the tab is launched
    pub launch_type: TabLaunchType,
    /// Live-view insertion index, `None` appends
    pub index: Option<usize>,
}

impl TabCreationRequest {
    /// Creates a request that appends a tab for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, launch_type: TabLaunchType) -> Self {
        Self {
            url: url.into(),
            title: None,
            launch_type,
            index: None,
        }
    }

    /// Sets the insertion index
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the initial title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Creates tabs in a collection
pub trait TabCreator {
    /// Creates a tab and adds it to `model`, returning its id.
    ///
    /// Returns `None` when the request is rejected.
    fn create_new_tab(
        &mut self,
        request: TabCreationRequest,
        model: &mut TabCollection,
        allocator: &TabIdAllocator,
    ) -> Option<TabId>;
}

fn build_tab(request: &TabCreationRequest, model: &TabCollection, id: TabId) -> Tab {
    let tab = Tab::new(id, model.mode(), request.url.clone());
    match &request.title {
        Some(title) => tab.with_title(title.clone()),
        None => tab,
    }
}

/// Creates live tabs, in the foreground unless the launch type opens in the
/// background.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveTabCreator;

impl TabCreator for LiveTabCreator {
    fn create_new_tab(
        &mut self,
        request: TabCreationRequest,
        model: &mut TabCollection,
        allocator: &TabIdAllocator,
    ) -> Option<TabId> {
        let creation_state = if request.launch_type.opens_in_background() {
            TabCreationState::LiveInBackground
        } else {
            TabCreationState::LiveInForeground
        };
        let id = allocator.allocate();
        let tab = build_tab(&request, model, id);
        model
            .add_tab(tab, request.index, request.launch_type, creation_state)
            .then_some(id)
    }
}

/// Recreates archived tabs as frozen tabs that load on first selection.
///
/// Archived tabs are never opened from the browser UI; such requests are a
/// caller bug and are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchivedTabCreator;

impl TabCreator for ArchivedTabCreator {
    fn create_new_tab(
        &mut self,
        request: TabCreationRequest,
        model: &mut TabCollection,
        allocator: &TabIdAllocator,
    ) -> Option<TabId> {
        debug_assert!(
            request.launch_type != TabLaunchType::FromBrowserUi,
            "archived tabs cannot be opened from the browser UI"
        );
        if request.launch_type == TabLaunchType::FromBrowserUi {
            tracing::warn!(url = %request.url, "Rejected archived tab launched from browser UI");
            return None;
        }

        let id = allocator.allocate();
        let tab = build_tab(&request, model, id);
        model
            .add_tab(
                tab,
                request.index,
                request.launch_type,
                TabCreationState::FrozenForLazyLoad,
            )
            .then_some(id)
    }
}
