//! Property tests for tab ordering in a collection

use proptest::prelude::*;
use tabkeeper_core::simulation::check_collection_invariants;
use tabkeeper_core::{
    ClosureParams, ProfileMode, Tab, TabCollection, TabCreationState, TabId, TabLaunchType,
    TabSelectionType,
};

fn collection_with(count: usize) -> (TabCollection, Vec<TabId>) {
    let mut model = TabCollection::new(ProfileMode::Regular);
    let mut ids = Vec::with_capacity(count);
    for raw in 0..count {
        let id = TabId::new(i32::try_from(raw).expect("small id"));
        model.add_tab(
            Tab::new(id, ProfileMode::Regular, format!("https://{raw}.test")),
            None,
            TabLaunchType::FromLink,
            TabCreationState::LiveInBackground,
        );
        ids.push(id);
    }
    (model, ids)
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Move(usize, usize),
    MoveRelated(usize, usize),
    Pin(usize),
    Unpin(usize),
    Merge(usize, usize),
    Ungroup(usize),
    Close(usize, bool),
    Undo,
    Commit,
    Select(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => (0usize..16, 0usize..17).prop_map(|(a, b)| Op::Move(a, b)),
        1 => (0usize..16, 0usize..17).prop_map(|(a, b)| Op::MoveRelated(a, b)),
        1 => (0usize..16).prop_map(Op::Pin),
        1 => (0usize..16).prop_map(Op::Unpin),
        2 => (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Merge(a, b)),
        1 => (0usize..16).prop_map(Op::Ungroup),
        2 => (0usize..16, any::<bool>()).prop_map(|(a, undo)| Op::Close(a, undo)),
        1 => Just(Op::Undo),
        1 => Just(Op::Commit),
        1 => (0usize..16).prop_map(Op::Select),
    ]
}

fn live(model: &TabCollection, pick: usize) -> Option<TabId> {
    let count = model.count();
    if count == 0 {
        return None;
    }
    model.tab_at(pick % count).map(Tab::id)
}

fn apply(model: &mut TabCollection, op: &Op, next_id: &mut i32) {
    match *op {
        Op::Add => {
            let id = TabId::new(*next_id);
            *next_id += 1;
            model.add_tab(
                Tab::new(id, ProfileMode::Regular, "about:blank"),
                None,
                TabLaunchType::FromLink,
                TabCreationState::LiveInForeground,
            );
        }
        Op::Move(pick, to) => {
            if let Some(id) = live(model, pick) {
                model.move_tab(id, to);
            }
        }
        Op::MoveRelated(pick, to) => {
            if let Some(id) = live(model, pick) {
                model.move_related_tabs(id, to);
            }
        }
        Op::Pin(pick) => {
            if let Some(id) = live(model, pick) {
                model.pin_tab(id);
            }
        }
        Op::Unpin(pick) => {
            if let Some(id) = live(model, pick) {
                model.unpin_tab(id);
            }
        }
        Op::Merge(a, b) => {
            if let (Some(source), Some(dest)) = (live(model, a), live(model, b)) {
                model.merge_tabs_to_group(source, dest);
            }
        }
        Op::Ungroup(pick) => {
            if let Some(id) = live(model, pick) {
                model.ungroup_tabs(&[id], false);
            }
        }
        Op::Close(pick, undo) => {
            if let Some(id) = live(model, pick) {
                model.close_tabs(ClosureParams::tab(id, undo));
            }
        }
        Op::Undo => {
            model.cancel_tab_closure(TabId::INVALID);
        }
        Op::Commit => model.commit_all_tab_closures(),
        Op::Select(pick) => {
            let count = model.count();
            if count > 0 {
                model.set_index(pick % count, TabSelectionType::FromUser);
            }
        }
    }
}

proptest! {
    /// A move lands at the insertion point measured before removal.
    #[test]
    fn move_tab_lands_at_insertion_point(count in 1usize..12, from in 0usize..12, to in 0usize..14) {
        let (mut model, ids) = collection_with(count);
        let from = from % count;
        let to = to.min(count);
        let tab = ids[from];

        let moved = model.move_tab(tab, to);
        let expected = if to > from { to - 1 } else { to };
        if to == from || to == from + 1 {
            prop_assert!(!moved);
            prop_assert_eq!(model.index_of(tab), Some(from));
        } else {
            prop_assert!(moved);
            prop_assert_eq!(model.index_of(tab), Some(expected));
        }
        prop_assert_eq!(model.count(), count);

        let mut remaining: Vec<TabId> = model.tabs().map(Tab::id).filter(|id| *id != tab).collect();
        let mut original = ids.clone();
        original.retain(|id| *id != tab);
        remaining.sort_unstable();
        original.sort_unstable();
        prop_assert_eq!(remaining, original);
    }

    /// Moving a tab never changes which tab is selected.
    #[test]
    fn move_tab_keeps_selection(count in 2usize..10, selected in 0usize..10, from in 0usize..10, to in 0usize..11) {
        let (mut model, ids) = collection_with(count);
        model.set_index(selected % count, TabSelectionType::FromUser);
        let before = model.selected_tab_id();
        model.move_tab(ids[from % count], to);
        prop_assert_eq!(model.selected_tab_id(), before);
    }

    /// Random mutation sequences keep ordering, grouping and selection
    /// consistent.
    #[test]
    fn random_mutations_keep_invariants(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut model = TabCollection::new(ProfileMode::Regular);
        let mut next_id = 0;
        for op in &ops {
            apply(&mut model, op, &mut next_id);
            if let Err(detail) = check_collection_invariants(&model) {
                prop_assert!(false, "after {:?}: {}", op, detail);
            }
        }
    }
}
