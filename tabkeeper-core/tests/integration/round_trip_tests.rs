//! Integration tests for saving a window and restoring it into a new selector

use tabkeeper_core::persistence::{StateLayout, TabPersistentStore};
use tabkeeper_core::{
    ClosureParams, InstanceId, LiveTabCreator, PersistenceSettings, ProfileMode, Tab,
    TabCreationState, TabGroupColor, TabIdAllocator, TabLaunchType, TabModelSelector,
    TabSelectionType,
};
use tempfile::TempDir;

fn settings() -> PersistenceSettings {
    PersistenceSettings::default().with_save_debounce_ms(0)
}

async fn open_store(temp: &TempDir) -> TabPersistentStore {
    let mut store =
        TabPersistentStore::with_layout(StateLayout::new(temp.path()), InstanceId::new(0), settings());
    store.wait_for_migration().await;
    store
}

fn new_selector() -> TabModelSelector {
    let mut selector = TabModelSelector::new(TabIdAllocator::new());
    selector.set_tab_creator(false, Box::new(LiveTabCreator));
    selector.set_tab_creator(true, Box::new(LiveTabCreator));
    selector
}

#[tokio::test]
async fn restored_tabs_keep_their_urls() {
    let temp = TempDir::new().expect("temp dir");
    let urls = [
        "https://example.test/",
        "https://docs.example.test/guide?page=2#intro",
        "about:blank",
        "https://例え.test/パス",
    ];

    {
        let store = open_store(&temp).await;
        let mut selector = new_selector();
        store.attach(&mut selector);
        for url in urls {
            selector
                .open_new_tab(url, false, TabLaunchType::FromLink)
                .expect("tab");
        }
        store.save_state().await.expect("save");
    }

    let mut store = open_store(&temp).await;
    let mut restored = new_selector();
    store.attach(&mut restored);
    let summary = store.load_state(&mut restored).await.expect("load");
    assert_eq!(summary.restored, urls.len());
    assert_eq!(summary.skipped, 0);

    let model = restored.model(false).expect("model");
    let got: Vec<&str> = model.tabs().map(Tab::url).collect();
    assert_eq!(got, urls);
}

#[tokio::test]
async fn restores_pinning_groups_selection_and_mode() {
    let temp = TempDir::new().expect("temp dir");
    let (group_members, max_id) = {
        let store = open_store(&temp).await;
        let mut selector = new_selector();
        store.attach(&mut selector);

        let ids: Vec<_> = (0..5)
            .map(|i| {
                selector
                    .open_new_tab(format!("https://site{i}.test/"), false, TabLaunchType::FromLink)
                    .expect("tab")
            })
            .collect();
        let incognito = selector
            .open_new_tab("https://private.test/", true, TabLaunchType::FromLink)
            .expect("incognito tab");

        let model = selector.model_mut(false).expect("model");
        model.pin_tab(ids[4]);
        let group = model.merge_tabs_to_group(ids[2], ids[1]).expect("group");
        model.set_tab_group_title(group, "Research");
        model.set_tab_group_color(group, TabGroupColor::Purple);
        model.set_tab_group_collapsed(group, true);
        // Pending closures are not persisted
        model.close_tabs(ClosureParams::tab(ids[3], true));
        model.set_index(2, TabSelectionType::FromUser);
        let members = model.tabs_in_group(group);
        selector.select_model(true);

        store.save_state().await.expect("save");
        (members, incognito.get())
    };

    let mut store = open_store(&temp).await;
    let mut restored = new_selector();
    store.attach(&mut restored);
    let summary = store.load_state(&mut restored).await.expect("load");
    assert_eq!(summary.restored, 5);
    assert_eq!(summary.groups, 1);
    assert!(summary.incognito_selected);
    assert!(restored.is_incognito_selected());

    let model = restored.model(false).expect("model");
    assert_eq!(model.count(), 4);
    assert!(model.tab_at(0).expect("tab").is_pinned());
    assert_eq!(model.selected_index(), Some(2));

    let groups = model.group_ids();
    assert_eq!(groups.len(), 1);
    assert_eq!(model.tabs_in_group(groups[0]), group_members);
    let visual = model.group_visual_data(groups[0]).expect("visual data");
    assert_eq!(visual.title, "Research");
    assert_eq!(visual.color, TabGroupColor::Purple);
    assert!(visual.collapsed);

    assert_eq!(restored.model(true).expect("incognito").count(), 1);
    assert!(restored.allocator().peek().get() > max_id);
}

#[tokio::test]
async fn tab_content_survives_restore() {
    let temp = TempDir::new().expect("temp dir");
    let allocator = TabIdAllocator::new();
    let id = allocator.allocate();
    {
        let store = open_store(&temp).await;
        let mut selector = TabModelSelector::new(allocator.clone());
        store.attach(&mut selector);
        let tab = Tab::new(id, ProfileMode::Regular, "https://state.test/")
            .with_title("State")
            .with_content(vec![1, 2, 3, 255]);
        selector.model_mut(false).expect("model").add_tab(
            tab,
            None,
            TabLaunchType::FromLink,
            TabCreationState::LiveInForeground,
        );
        store.save_state().await.expect("save");
    }

    let mut store = open_store(&temp).await;
    let mut restored = new_selector();
    store.attach(&mut restored);
    store.load_state(&mut restored).await.expect("load");
    let tab = restored.get_tab_by_id(id).expect("restored tab");
    assert_eq!(tab.title(), "State");
    assert_eq!(tab.content(), &[1, 2, 3, 255]);
    assert_eq!(tab.launch_type(), TabLaunchType::FromRestore);
}

#[tokio::test]
async fn missing_state_restores_nothing() {
    let temp = TempDir::new().expect("temp dir");
    let mut store = open_store(&temp).await;
    let mut selector = new_selector();
    store.attach(&mut selector);
    let summary = store.load_state(&mut selector).await.expect("load");
    assert_eq!(summary.restored, 0);
    assert_eq!(selector.total_tab_count(), 0);
}
