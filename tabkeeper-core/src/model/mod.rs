//! Tab model: collections, closure tracking, groups and selection
//!
//! This module provides:
//! - `TabCollection` - the ordered, single-selection collection of one mode
//! - `ClosureTracker` / `ClosureParams` - undoable closure bookkeeping
//! - `GroupRegistry` / `TabGroupVisualData` - tab group visual state
//! - `TabMutationObserver` / `TabClosureObserver` - change notifications
//! - `TabModelSelector` - the regular/incognito pair of a window
//! - `TabCreator` implementations

mod closure;
mod collection;
mod creator;
mod groups;
mod observer;
mod selector;

pub use closure::{ClosureParams, ClosureTarget, ClosureTracker};
pub use collection::TabCollection;
pub use creator::{ArchivedTabCreator, LiveTabCreator, TabCreationRequest, TabCreator};
pub use groups::{GroupRegistry, TabGroupVisualData};
pub use observer::{
    ModelRequest, ModelRequests, SharedClosureObserver, SharedMutationObserver,
    TabClosureObserver, TabMutationObserver,
};
pub use selector::TabModelSelector;
