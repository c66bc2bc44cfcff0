//! Property tests for undoable tab closure

use proptest::prelude::*;
use tabkeeper_core::simulation::check_collection_invariants;
use tabkeeper_core::{
    ClosureParams, ProfileMode, Tab, TabCollection, TabCreationState, TabId, TabLaunchType,
};

#[derive(Debug, Clone)]
enum Op {
    Add,
    Close(usize),
    CloseMany(Vec<usize>),
    Cancel(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        3 => (0usize..32).prop_map(Op::Close),
        1 => prop::collection::vec(0usize..32, 1..5).prop_map(Op::CloseMany),
        2 => (0usize..32).prop_map(Op::Cancel),
    ]
}

fn live_id(model: &TabCollection, pick: usize) -> Option<TabId> {
    let count = model.count();
    (count > 0)
        .then(|| model.tab_at(pick % count).map(Tab::id))
        .flatten()
}

proptest! {
    /// Cancelling every pending closure restores exactly the tabs that were
    /// added, in insertion order.
    #[test]
    fn cancel_all_restores_every_tab(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut model = TabCollection::new(ProfileMode::Regular);
        let mut added = Vec::new();
        let mut next = 0;

        for op in ops {
            match op {
                Op::Add => {
                    let id = TabId::new(next);
                    next += 1;
                    let tab = Tab::new(id, ProfileMode::Regular, format!("https://{}.test", id.get()));
                    prop_assert!(model.add_tab(
                        tab,
                        None,
                        TabLaunchType::FromLink,
                        TabCreationState::LiveInForeground,
                    ));
                    added.push(id);
                }
                Op::Close(pick) => {
                    if let Some(id) = live_id(&model, pick) {
                        prop_assert_eq!(model.close_tabs(ClosureParams::tab(id, true)), 1);
                    }
                }
                Op::CloseMany(picks) => {
                    let ids: Vec<TabId> = picks.iter().filter_map(|p| live_id(&model, *p)).collect();
                    model.close_tabs(ClosureParams::tabs(ids, true));
                }
                Op::Cancel(pick) => {
                    let pending: Vec<TabId> = model
                        .comprehensive_tabs()
                        .map(Tab::id)
                        .filter(|id| model.is_pending_closure(*id))
                        .collect();
                    if !pending.is_empty() {
                        let id = pending[pick % pending.len()];
                        prop_assert_eq!(model.cancel_tab_closure(id), 1);
                    }
                }
            }
            prop_assert_eq!(model.count() + model.pending_closure_count(), added.len());
            prop_assert!(check_collection_invariants(&model).is_ok());
        }

        model.cancel_tab_closure(TabId::INVALID);
        prop_assert_eq!(model.pending_closure_count(), 0);
        let order: Vec<TabId> = model.tabs().map(Tab::id).collect();
        prop_assert_eq!(order, added);
        prop_assert!(model.selected_tab_id().is_some() || model.is_empty());
    }

    /// Closing without undo removes tabs for good and never leaves them
    /// pending.
    #[test]
    fn committed_closures_are_final(count in 1i32..20, picks in prop::collection::vec(0usize..20, 1..10)) {
        let mut model = TabCollection::new(ProfileMode::Regular);
        for i in 0..count {
            let tab = Tab::new(TabId::new(i), ProfileMode::Regular, "about:blank");
            model.add_tab(tab, None, TabLaunchType::FromLink, TabCreationState::LiveInBackground);
        }
        let mut closed = 0;
        for pick in picks {
            if let Some(id) = live_id(&model, pick) {
                closed += model.close_tabs(ClosureParams::tab(id, false));
                prop_assert!(!model.contains(id));
            }
        }
        prop_assert_eq!(model.pending_closure_count(), 0);
        prop_assert_eq!(model.cancel_tab_closure(TabId::INVALID), 0);
        prop_assert_eq!(model.count() + closed, count as usize);
    }
}
