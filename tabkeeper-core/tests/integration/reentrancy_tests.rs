//! Integration tests for observers that mutate the collection they observe

use std::cell::RefCell;
use std::rc::Rc;

use tabkeeper_core::{
    ClosureParams, ModelRequests, ProfileMode, Tab, TabClosureObserver, TabCollection,
    TabCreationState, TabId, TabLaunchType, TabMutationObserver, TabSelectionType,
};

/// Closes every tab whenever a new one is about to be added.
#[derive(Default)]
struct CloseAllOnAdd {
    triggered: usize,
}

impl TabMutationObserver for CloseAllOnAdd {
    fn will_add_tab(
        &mut self,
        model: &TabCollection,
        _tab: &Tab,
        _launch_type: TabLaunchType,
        requests: &mut ModelRequests,
    ) {
        if !model.is_empty() {
            self.triggered += 1;
            requests.close_tabs(ClosureParams::all(false));
        }
    }
}

/// Records closure notifications in order.
#[derive(Default)]
struct ClosureLog {
    events: Vec<String>,
}

impl TabClosureObserver for ClosureLog {
    fn will_close_tab(&mut self, _model: &TabCollection, tab: &Tab) {
        self.events.push(format!("will_close {}", tab.id().get()));
    }

    fn tab_pending_closure(&mut self, _model: &TabCollection, tab: &Tab) {
        self.events.push(format!("pending {}", tab.id().get()));
    }

    fn tab_closure_undone(&mut self, _model: &TabCollection, tab: &Tab) {
        self.events.push(format!("undone {}", tab.id().get()));
    }

    fn tab_closure_committed(&mut self, _model: &TabCollection, tab: &Tab) {
        self.events.push(format!("committed {}", tab.id().get()));
    }

    fn all_tabs_closure_committed(&mut self, _model: &TabCollection) {
        self.events.push("all_committed".to_string());
    }
}

/// Selects the first tab after every insertion.
#[derive(Default)]
struct SelectFirstOnAdd;

impl TabMutationObserver for SelectFirstOnAdd {
    fn did_add_tab(
        &mut self,
        _model: &TabCollection,
        _tab_id: TabId,
        _launch_type: TabLaunchType,
        _creation_state: TabCreationState,
        requests: &mut ModelRequests,
    ) {
        requests.set_index(0, TabSelectionType::FromUser);
    }
}

fn add(model: &mut TabCollection, id: i32) -> bool {
    model.add_tab(
        Tab::new(TabId::new(id), ProfileMode::Regular, format!("https://{id}.test")),
        None,
        TabLaunchType::FromLink,
        TabCreationState::LiveInForeground,
    )
}

#[test]
fn close_all_from_will_add_converges_to_one_tab() {
    let mut model = TabCollection::new(ProfileMode::Regular);
    let observer = Rc::new(RefCell::new(CloseAllOnAdd::default()));
    model.add_mutation_observer(observer.clone());

    for id in 0..6 {
        assert!(add(&mut model, id));
        assert_eq!(model.count(), 1);
        assert_eq!(model.comprehensive_count(), 1);
        assert_eq!(model.selected_tab_id(), Some(TabId::new(id)));
    }
    assert_eq!(observer.borrow().triggered, 5);
}

#[test]
fn closure_notifications_are_ordered() {
    let mut model = TabCollection::new(ProfileMode::Regular);
    let log = Rc::new(RefCell::new(ClosureLog::default()));
    model.add_closure_observer(log.clone());
    for id in 0..2 {
        add(&mut model, id);
    }

    model.close_tabs(ClosureParams::tab(TabId::new(0), true));
    model.cancel_tab_closure(TabId::new(0));
    model.close_tabs(ClosureParams::all(true));
    model.commit_all_tab_closures();

    assert_eq!(
        log.borrow().events,
        vec![
            "will_close 0",
            "pending 0",
            "undone 0",
            "will_close 0",
            "will_close 1",
            "pending 0",
            "pending 1",
            "committed 0",
            "committed 1",
            "all_committed",
        ]
    );
}

#[test]
fn set_index_requested_from_did_add_wins_over_foreground_selection() {
    let mut model = TabCollection::new(ProfileMode::Regular);
    model.add_mutation_observer(Rc::new(RefCell::new(SelectFirstOnAdd)));
    for id in 0..4 {
        add(&mut model, id);
    }
    assert_eq!(model.selected_index(), Some(0));
    assert_eq!(model.count(), 4);
}

#[test]
fn removed_observer_is_not_notified() {
    let mut model = TabCollection::new(ProfileMode::Regular);
    let observer = Rc::new(RefCell::new(CloseAllOnAdd::default()));
    let shared: tabkeeper_core::SharedMutationObserver = observer.clone();
    model.add_mutation_observer(shared.clone());
    add(&mut model, 0);
    assert!(model.remove_mutation_observer(&shared));
    add(&mut model, 1);
    assert_eq!(model.count(), 2);
    assert_eq!(observer.borrow().triggered, 0);
}
