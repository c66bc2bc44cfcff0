//! Integration tests for closed-window cleanup

use std::collections::HashSet;

use tabkeeper_core::persistence::{
    PersistedMetadata, StateLayout, TabEntry, TabStateStore, cleanup_instance_state,
    delete_tab_files,
};
use tabkeeper_core::{InstanceId, TabId};
use tempfile::TempDir;

fn entry(id: i32) -> TabEntry {
    TabEntry {
        id: TabId::new(id),
        url: format!("https://example.test/{id}"),
        title: format!("Tab {id}"),
        pinned: false,
        group_id: None,
    }
}

fn save_window(layout: &StateLayout, window: u32, regular: &[i32], incognito: &[i32]) {
    let mut metadata = PersistedMetadata::new(InstanceId::new(window));
    metadata.regular.tabs = regular.iter().copied().map(entry).collect();
    metadata.incognito.tabs = incognito.iter().copied().map(entry).collect();
    metadata
        .save_to_file(&layout.metadata_path(InstanceId::new(window)))
        .expect("save metadata");
}

async fn run_cleanup(layout: &StateLayout, window: u32) -> Vec<(TabId, bool)> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    cleanup_instance_state(layout.clone(), InstanceId::new(window), move |tabs| {
        let _ = tx.send(tabs);
    })
    .await
    .expect("join")
    .expect("cleanup");
    rx.await.expect("callback")
}

#[tokio::test]
async fn reports_only_unshared_tabs() {
    let temp = TempDir::new().expect("temp dir");
    let layout = StateLayout::new(temp.path());
    save_window(&layout, 0, &[1, 6], &[19]);
    save_window(&layout, 1, &[4, 6, 7], &[12, 14, 19]);
    save_window(&layout, 2, &[7], &[]);

    let tabs = run_cleanup(&layout, 1).await;
    let got: HashSet<_> = tabs.into_iter().collect();
    let expected: HashSet<_> = [
        (TabId::new(4), false),
        (TabId::new(12), true),
        (TabId::new(14), true),
    ]
    .into_iter()
    .collect();
    assert_eq!(got, expected);

    assert!(!layout.metadata_path(InstanceId::new(1)).exists());
    assert!(layout.metadata_path(InstanceId::new(0)).exists());
    assert!(layout.metadata_path(InstanceId::new(2)).exists());
}

#[tokio::test]
async fn same_id_in_other_mode_is_not_shared() {
    let temp = TempDir::new().expect("temp dir");
    let layout = StateLayout::new(temp.path());
    save_window(&layout, 0, &[], &[5]);
    save_window(&layout, 3, &[5], &[]);

    assert_eq!(run_cleanup(&layout, 3).await, vec![(TabId::new(5), false)]);
}

#[tokio::test]
async fn callback_can_delete_tab_files() {
    let temp = TempDir::new().expect("temp dir");
    let layout = StateLayout::new(temp.path());
    let store = TabStateStore::new(layout.clone());
    save_window(&layout, 0, &[2], &[]);
    save_window(&layout, 1, &[2, 3], &[]);
    std::fs::write(layout.tab_file_path(TabId::new(2), false), "{}").expect("write");
    std::fs::write(layout.tab_file_path(TabId::new(3), false), "{}").expect("write");

    let tabs = run_cleanup(&layout, 1).await;
    assert_eq!(delete_tab_files(&store, &tabs), 1);
    assert!(store.exists(TabId::new(2), false));
    assert!(!store.exists(TabId::new(3), false));
}

#[tokio::test]
async fn unknown_window_yields_nothing() {
    let temp = TempDir::new().expect("temp dir");
    let layout = StateLayout::new(temp.path());
    save_window(&layout, 0, &[1], &[]);
    assert!(run_cleanup(&layout, 4).await.is_empty());
    assert!(layout.metadata_path(InstanceId::new(0)).exists());
}
