//! Property tests for tab groups

use std::collections::HashSet;

use proptest::prelude::*;
use tabkeeper_core::simulation::check_collection_invariants;
use tabkeeper_core::{
    ClosureParams, ProfileMode, Tab, TabCollection, TabCreationState, TabGroupColor, TabId,
    TabLaunchType,
};

fn collection_with(count: i32) -> (TabCollection, Vec<TabId>) {
    let mut model = TabCollection::new(ProfileMode::Regular);
    let ids: Vec<TabId> = (0..count).map(TabId::new).collect();
    for id in &ids {
        model.add_tab(
            Tab::new(*id, ProfileMode::Regular, "about:blank"),
            None,
            TabLaunchType::FromLink,
            TabCreationState::LiveInBackground,
        );
    }
    (model, ids)
}

proptest! {
    /// Up to a full palette of groups created in a row get distinct colors.
    #[test]
    fn new_groups_get_distinct_colors(groups in 1usize..=TabGroupColor::PALETTE.len()) {
        let pairs = i32::try_from(groups).expect("small count");
        let (mut model, ids) = collection_with(pairs * 2);
        let mut colors = HashSet::new();
        for pair in ids.chunks(2) {
            let group = model.merge_tabs_to_group(pair[1], pair[0]).expect("group");
            let visual = model.group_visual_data(group).expect("visual data");
            prop_assert!(colors.insert(visual.color));
        }
        prop_assert_eq!(model.group_count(), groups);
        prop_assert!(check_collection_invariants(&model).is_ok());
    }

    /// Pinning a grouped tab takes it out of the group, and the group is
    /// dropped once nobody is left in it.
    #[test]
    fn pinning_leaves_the_group(size in 2i32..6, pick in 0usize..6) {
        let (mut model, ids) = collection_with(size + 1);
        let dest = ids[0];
        let members = &ids[1..];
        let group = model.merge_list_of_tabs_to_group(members, dest).expect("group");
        let pinned = ids[pick % ids.len()];

        prop_assert!(model.pin_tab(pinned));
        let tab = model.get_tab(pinned).expect("tab");
        prop_assert!(tab.is_pinned());
        prop_assert_eq!(tab.group_id(), None);
        prop_assert_eq!(model.index_of(pinned), Some(0));
        prop_assert!(!model.tabs_in_group(group).contains(&pinned));
        prop_assert!(model.has_group(group));
        prop_assert!(check_collection_invariants(&model).is_ok());

        for id in model.tabs_in_group(group) {
            model.pin_tab(id);
        }
        prop_assert!(!model.has_group(group));
        prop_assert_eq!(model.group_count(), 0);
    }

    /// Closing a whole group with undo keeps the group until the closure is
    /// committed.
    #[test]
    fn group_survives_until_closure_commits(size in 1i32..6, undo in any::<bool>()) {
        let (mut model, ids) = collection_with(size + 2);
        let group = model.merge_list_of_tabs_to_group(&ids[1..=usize::try_from(size).expect("size")], ids[0])
            .expect("group");
        let members = model.tabs_in_group(group);

        prop_assert_eq!(model.close_tabs(ClosureParams::group(group, true)), members.len());
        prop_assert!(model.has_group(group));
        if undo {
            model.cancel_tab_closure(TabId::INVALID);
            prop_assert_eq!(model.tabs_in_group(group), members);
        } else {
            model.commit_all_tab_closures();
            prop_assert!(!model.has_group(group));
        }
        prop_assert!(check_collection_invariants(&model).is_ok());
    }
}
