//! Integration tests for tabs moving between persisted windows

use tabkeeper_core::persistence::{
    PersistedMetadata, StateLayout, TabPersistentStore, cleanup_instance_state, delete_tab_files,
};
use tabkeeper_core::{
    InstanceId, LiveTabCreator, PersistenceSettings, TabId, TabIdAllocator, TabLaunchType,
    TabWindowManager,
};
use tempfile::TempDir;

fn open_tab(manager: &mut TabWindowManager, window: InstanceId, url: &str) -> TabId {
    manager
        .selector_mut(window)
        .and_then(|selector| selector.open_new_tab(url, false, TabLaunchType::FromLink))
        .expect("tab")
}

#[tokio::test]
async fn moved_tab_survives_closing_its_old_window() {
    let temp = TempDir::new().expect("temp dir");
    let layout = StateLayout::new(temp.path());
    let settings = PersistenceSettings::default().with_save_debounce_ms(0);

    let mut manager = TabWindowManager::new(TabIdAllocator::new(), 2);
    let first = manager.request_selector(None).expect("window");
    let second = manager.request_selector(None).expect("window");

    let mut stores = Vec::new();
    for window in [first, second] {
        let mut store = TabPersistentStore::with_layout(layout.clone(), window, settings.clone());
        store.wait_for_migration().await;
        let selector = manager.selector_mut(window).expect("selector");
        selector.set_tab_creator(false, Box::new(LiveTabCreator));
        store.attach(selector);
        stores.push(store);
    }

    open_tab(&mut manager, first, "https://one.test/");
    let stays = open_tab(&mut manager, second, "https://two.test/");
    let moves = open_tab(&mut manager, second, "https://three.test/");
    for store in &stores {
        store.save_state().await.expect("save");
    }

    manager
        .move_tab_to_window(moves, first, None)
        .expect("move tab");
    stores[0].save_state().await.expect("save first window");
    let first_saved =
        PersistedMetadata::load_from_file(&layout.metadata_path(first)).expect("metadata");
    assert!(first_saved.referenced_tabs().contains(&(moves, false)));

    let second_store = stores.pop().expect("second store");
    second_store.save_state().await.expect("save second window");
    manager.remove_window(second).expect("closed");
    let (tx, rx) = tokio::sync::oneshot::channel();
    cleanup_instance_state(layout.clone(), second, move |tabs| {
        let _ = tx.send(tabs);
    })
    .await
    .expect("join")
    .expect("cleanup");
    let unreferenced = rx.await.expect("callback");
    assert_eq!(unreferenced, vec![(stays, false)]);

    assert_eq!(delete_tab_files(&second_store.tab_state_store(), &unreferenced), 1);
    assert!(layout.tab_file_path(moves, false).is_file());
    assert!(!layout.tab_file_path(stays, false).exists());
    assert!(!layout.metadata_path(InstanceId::new(1)).exists());
}
