//! Selection between the regular and incognito collections

use std::fmt;

use super::closure::ClosureParams;
use super::collection::TabCollection;
use super::creator::{TabCreationRequest, TabCreator};
use super::observer::{SharedClosureObserver, SharedMutationObserver};
use crate::error::{TabError, TabResult};
use crate::tab::{ProfileMode, Tab, TabId, TabIdAllocator, TabLaunchType};

/// The two collections of a window
#[derive(Debug)]
struct ModelPair {
    regular: TabCollection,
    incognito: TabCollection,
}

/// Owns the regular and incognito collections of one window and tracks which
/// one is current.
///
/// The collections are either created eagerly ([`Self::new`]) or supplied
/// later ([`Self::new_uninitialized`] + [`Self::initialize`]). Observers
/// added before initialization are registered on both collections once they
/// arrive.
pub struct TabModelSelector {
    allocator: TabIdAllocator,
    models: Option<ModelPair>,
    incognito_selected: bool,
    mutation_observers: Vec<SharedMutationObserver>,
    closure_observers: Vec<SharedClosureObserver>,
    regular_creator: Option<Box<dyn TabCreator>>,
    incognito_creator: Option<Box<dyn TabCreator>>,
}

impl fmt::Debug for TabModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabModelSelector")
            .field("models", &self.models)
            .field("incognito_selected", &self.incognito_selected)
            .field("mutation_observers", &self.mutation_observers.len())
            .field("closure_observers", &self.closure_observers.len())
            .finish_non_exhaustive()
    }
}

impl TabModelSelector {
    /// Creates a selector with two empty collections.
    #[must_use]
    pub fn new(allocator: TabIdAllocator) -> Self {
        let mut selector = Self::new_uninitialized(allocator);
        selector.install(
            TabCollection::new(ProfileMode::Regular),
            TabCollection::new(ProfileMode::Incognito),
        );
        selector
    }

    /// Creates a selector whose collections are supplied later.
    #[must_use]
    pub fn new_uninitialized(allocator: TabIdAllocator) -> Self {
        Self {
            allocator,
            models: None,
            incognito_selected: false,
            mutation_observers: Vec::new(),
            closure_observers: Vec::new(),
            regular_creator: None,
            incognito_creator: None,
        }
    }

    /// Supplies the collections of an uninitialized selector.
    ///
    /// # Errors
    ///
    /// Returns `TabError::AlreadyInitialized` if the selector already has
    /// collections, or `TabError::ModeMismatch` if a collection belongs to
    /// the wrong mode.
    pub fn initialize(&mut self, regular: TabCollection, incognito: TabCollection) -> TabResult<()> {
        if self.models.is_some() {
            return Err(TabError::AlreadyInitialized);
        }
        for (expected, model) in [
            (ProfileMode::Regular, &regular),
            (ProfileMode::Incognito, &incognito),
        ] {
            if model.mode() != expected {
                return Err(TabError::ModeMismatch {
                    expected: expected.to_string(),
                    actual: model.mode().to_string(),
                });
            }
        }
        self.install(regular, incognito);
        tracing::debug!(
            observers = self.mutation_observers.len() + self.closure_observers.len(),
            "Tab model selector initialized"
        );
        Ok(())
    }

    fn install(&mut self, mut regular: TabCollection, mut incognito: TabCollection) {
        for model in [&mut regular, &mut incognito] {
            for observer in &self.mutation_observers {
                model.add_mutation_observer(observer.clone());
            }
            for observer in &self.closure_observers {
                model.add_closure_observer(observer.clone());
            }
        }
        regular.set_active(!self.incognito_selected);
        incognito.set_active(self.incognito_selected);
        self.models = Some(ModelPair { regular, incognito });
    }

    /// Returns true once both collections are present
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.models.is_some()
    }

    /// Returns the shared id allocator
    #[must_use]
    pub const fn allocator(&self) -> &TabIdAllocator {
        &self.allocator
    }

    /// Registers a mutation observer on both collections, now or at
    /// initialization.
    pub fn add_mutation_observer(&mut self, observer: SharedMutationObserver) {
        if let Some(models) = &mut self.models {
            models.regular.add_mutation_observer(observer.clone());
            models.incognito.add_mutation_observer(observer.clone());
        }
        self.mutation_observers.push(observer);
    }

    /// Registers a closure observer on both collections, now or at
    /// initialization.
    pub fn add_closure_observer(&mut self, observer: SharedClosureObserver) {
        if let Some(models) = &mut self.models {
            models.regular.add_closure_observer(observer.clone());
            models.incognito.add_closure_observer(observer.clone());
        }
        self.closure_observers.push(observer);
    }

    /// Supplies the creator used by [`Self::open_new_tab`] for one mode.
    pub fn set_tab_creator(&mut self, incognito: bool, creator: Box<dyn TabCreator>) {
        if incognito {
            self.incognito_creator = Some(creator);
        } else {
            self.regular_creator = Some(creator);
        }
    }

    /// Returns the collection for a mode.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotInitialized` before initialization.
    pub fn model(&self, incognito: bool) -> TabResult<&TabCollection> {
        let models = self.models.as_ref().ok_or(TabError::NotInitialized)?;
        Ok(if incognito {
            &models.incognito
        } else {
            &models.regular
        })
    }

    /// Returns the collection for a mode, mutably.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotInitialized` before initialization.
    pub fn model_mut(&mut self, incognito: bool) -> TabResult<&mut TabCollection> {
        let models = self.models.as_mut().ok_or(TabError::NotInitialized)?;
        Ok(if incognito {
            &mut models.incognito
        } else {
            &mut models.regular
        })
    }

    /// Returns the current collection.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotInitialized` before initialization.
    pub fn current_model(&self) -> TabResult<&TabCollection> {
        self.model(self.incognito_selected)
    }

    /// Returns the current collection, mutably.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotInitialized` before initialization.
    pub fn current_model_mut(&mut self) -> TabResult<&mut TabCollection> {
        self.model_mut(self.incognito_selected)
    }

    /// Returns true if the incognito collection is current
    #[must_use]
    pub const fn is_incognito_selected(&self) -> bool {
        self.incognito_selected
    }

    /// Makes the collection for `incognito` current.
    ///
    /// The current tab of the previous collection is hidden, not destroyed.
    /// Returns false if nothing changed.
    pub fn select_model(&mut self, incognito: bool) -> bool {
        if self.incognito_selected == incognito {
            return false;
        }
        let Some(models) = &mut self.models else {
            self.incognito_selected = incognito;
            return true;
        };
        self.incognito_selected = incognito;
        models.regular.set_active(!incognito);
        models.incognito.set_active(incognito);

        let current = if incognito {
            &models.incognito
        } else {
            &models.regular
        };
        tracing::debug!(incognito, "Current tab model changed");
        for observer in &self.mutation_observers {
            observer.borrow_mut().did_change_current_model(current);
        }
        true
    }

    /// Opens a tab through the creator registered for the mode.
    ///
    /// Returns `None` if no creator is registered, the selector is not
    /// initialized, or the creator rejects the request.
    pub fn open_new_tab(
        &mut self,
        url: impl Into<String>,
        incognito: bool,
        launch_type: TabLaunchType,
    ) -> Option<TabId> {
        let models = self.models.as_mut()?;
        let (creator, model) = if incognito {
            (self.incognito_creator.as_mut()?, &mut models.incognito)
        } else {
            (self.regular_creator.as_mut()?, &mut models.regular)
        };
        creator.create_new_tab(
            TabCreationRequest::new(url, launch_type),
            model,
            &self.allocator,
        )
    }

    /// Closes every live tab in both collections.
    pub fn close_all_tabs(&mut self, allow_undo: bool) -> usize {
        let Some(models) = &mut self.models else {
            return 0;
        };
        models.regular.close_tabs(ClosureParams::all(allow_undo))
            + models.incognito.close_tabs(ClosureParams::all(allow_undo))
    }

    /// Commits every pending closure in both collections.
    pub fn commit_all_tab_closures(&mut self) {
        if let Some(models) = &mut self.models {
            models.regular.commit_all_tab_closures();
            models.incognito.commit_all_tab_closures();
        }
    }

    /// Number of live tabs across both collections
    #[must_use]
    pub fn total_tab_count(&self) -> usize {
        self.models
            .as_ref()
            .map_or(0, |m| m.regular.count() + m.incognito.count())
    }

    /// Looks up a tab in either collection
    #[must_use]
    pub fn get_tab_by_id(&self, tab_id: TabId) -> Option<&Tab> {
        let models = self.models.as_ref()?;
        models
            .regular
            .get_tab(tab_id)
            .or_else(|| models.incognito.get_tab(tab_id))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::{LiveTabCreator, TabMutationObserver};
    use crate::tab::TabSelectionType;

    #[derive(Default)]
    struct Counter {
        added: usize,
        model_changes: usize,
    }

    impl TabMutationObserver for Counter {
        fn did_add_tab(
            &mut self,
            _model: &TabCollection,
            _tab_id: TabId,
            _launch_type: TabLaunchType,
            _creation_state: crate::tab::TabCreationState,
            _requests: &mut crate::model::ModelRequests,
        ) {
            self.added += 1;
        }

        fn did_change_current_model(&mut self, _model: &TabCollection) {
            self.model_changes += 1;
        }
    }

    fn selector_with_creators() -> TabModelSelector {
        let mut selector = TabModelSelector::new(TabIdAllocator::new());
        selector.set_tab_creator(false, Box::new(LiveTabCreator));
        selector.set_tab_creator(true, Box::new(LiveTabCreator));
        selector
    }

    #[test]
    fn uninitialized_selector_reports_error() {
        let selector = TabModelSelector::new_uninitialized(TabIdAllocator::new());
        assert!(matches!(selector.model(false), Err(TabError::NotInitialized)));
        assert_eq!(selector.total_tab_count(), 0);
    }

    #[test]
    fn observers_registered_before_initialize_are_attached() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut selector = TabModelSelector::new_uninitialized(TabIdAllocator::new());
        selector.add_mutation_observer(counter.clone());
        selector
            .initialize(
                TabCollection::new(ProfileMode::Regular),
                TabCollection::new(ProfileMode::Incognito),
            )
            .expect("initialize");
        selector.set_tab_creator(true, Box::new(LiveTabCreator));
        selector.set_tab_creator(false, Box::new(LiveTabCreator));

        selector.open_new_tab("https://a.test", false, TabLaunchType::FromLink);
        selector.open_new_tab("https://b.test", true, TabLaunchType::FromLink);
        assert_eq!(counter.borrow().added, 2);
    }

    #[test]
    fn initialize_twice_fails() {
        let mut selector = TabModelSelector::new(TabIdAllocator::new());
        let result = selector.initialize(
            TabCollection::new(ProfileMode::Regular),
            TabCollection::new(ProfileMode::Incognito),
        );
        assert!(matches!(result, Err(TabError::AlreadyInitialized)));
    }

    #[test]
    fn initialize_rejects_swapped_modes() {
        let mut selector = TabModelSelector::new_uninitialized(TabIdAllocator::new());
        let result = selector.initialize(
            TabCollection::new(ProfileMode::Incognito),
            TabCollection::new(ProfileMode::Regular),
        );
        assert!(matches!(result, Err(TabError::ModeMismatch { .. })));
    }

    #[test]
    fn open_new_tab_without_creator_returns_none() {
        let mut selector = TabModelSelector::new(TabIdAllocator::new());
        assert!(
            selector
                .open_new_tab("https://a.test", false, TabLaunchType::FromLink)
                .is_none()
        );
    }

    #[test]
    fn select_model_hides_previous_tab() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut selector = selector_with_creators();
        selector.add_mutation_observer(counter.clone());

        let regular = selector
            .open_new_tab("https://a.test", false, TabLaunchType::FromBrowserUi)
            .expect("regular tab");
        let incognito = selector
            .open_new_tab("https://b.test", true, TabLaunchType::FromBrowserUi)
            .expect("incognito tab");
        assert!(selector.get_tab_by_id(incognito).is_some_and(Tab::is_hidden));

        assert!(selector.select_model(true));
        assert!(!selector.select_model(true));
        assert!(selector.get_tab_by_id(regular).is_some_and(Tab::is_hidden));
        assert!(!selector.get_tab_by_id(incognito).is_some_and(Tab::is_hidden));
        assert_eq!(selector.total_tab_count(), 2);
        assert_eq!(counter.borrow().model_changes, 1);
        assert!(
            selector
                .current_model()
                .is_ok_and(|m| m.selected_tab_id() == Some(incognito))
        );
    }

    #[test]
    fn close_all_and_commit_across_modes() {
        let mut selector = selector_with_creators();
        selector.open_new_tab("https://a.test", false, TabLaunchType::FromLink);
        selector.open_new_tab("https://b.test", false, TabLaunchType::FromLink);
        selector.open_new_tab("https://c.test", true, TabLaunchType::FromLink);

        assert_eq!(selector.close_all_tabs(true), 3);
        assert_eq!(selector.total_tab_count(), 0);
        selector.commit_all_tab_closures();
        assert!(
            selector
                .model(false)
                .is_ok_and(|m| m.comprehensive_count() == 0)
        );
    }

    #[test]
    fn current_model_selection_survives_switch() {
        let mut selector = selector_with_creators();
        selector.open_new_tab("https://a.test", false, TabLaunchType::FromLink);
        selector.open_new_tab("https://b.test", false, TabLaunchType::FromLink);
        selector
            .current_model_mut()
            .expect("model")
            .set_index(0, TabSelectionType::FromUser);
        selector.select_model(true);
        selector.select_model(false);
        assert_eq!(selector.current_model().expect("model").selected_index(), Some(0));
    }
}
