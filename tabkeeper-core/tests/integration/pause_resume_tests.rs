//! Integration tests for pausing and resuming metadata saves

use std::time::Duration;

use tabkeeper_core::persistence::{
    PersistedMetadata, PersistenceEvent, StateLayout, TabPersistentStore,
};
use tabkeeper_core::{
    ClosureParams, InstanceId, LiveTabCreator, PersistenceSettings, TabIdAllocator,
    TabLaunchType, TabModelSelector,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

struct Fixture {
    _temp: TempDir,
    store: TabPersistentStore,
    selector: TabModelSelector,
    events: UnboundedReceiver<PersistenceEvent>,
}

async fn fixture(tabs: usize) -> Fixture {
    fixture_with(tabs, PersistenceSettings::default().with_save_debounce_ms(0)).await
}

async fn fixture_with(tabs: usize, settings: PersistenceSettings) -> Fixture {
    let temp = TempDir::new().expect("temp dir");
    let mut store =
        TabPersistentStore::with_layout(StateLayout::new(temp.path()), InstanceId::new(0), settings);
    store.wait_for_migration().await;

    let mut selector = TabModelSelector::new(TabIdAllocator::new());
    selector.set_tab_creator(false, Box::new(LiveTabCreator));
    store.attach(&mut selector);
    let events = store
        .coordinator()
        .borrow_mut()
        .take_events()
        .expect("events");

    for i in 0..tabs {
        selector
            .open_new_tab(format!("https://example.test/{i}"), false, TabLaunchType::FromLink)
            .expect("tab");
    }
    store.save_state().await.expect("initial save");

    let mut fixture = Fixture {
        _temp: temp,
        store,
        selector,
        events,
    };
    drain(&mut fixture.events).await;
    fixture
}

async fn drain(events: &mut UnboundedReceiver<PersistenceEvent>) -> Vec<PersistenceEvent> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

fn metadata_saves(events: &[PersistenceEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PersistenceEvent::MetadataSaved { .. }))
        .count()
}

fn saved_tab_count(fixture: &Fixture) -> usize {
    let path = fixture.store.layout().metadata_path(InstanceId::new(0));
    PersistedMetadata::load_from_file(&path)
        .expect("metadata")
        .tab_count()
}

#[tokio::test]
async fn paused_saves_still_delete_tab_files() {
    let mut f = fixture(3).await;
    assert_eq!(saved_tab_count(&f), 3);

    f.store.coordinator().borrow_mut().pause_save_tab_list();
    let closed = f.selector.current_model().expect("model").tab_at(0).expect("tab").id();
    f.selector
        .current_model_mut()
        .expect("model")
        .close_tabs(ClosureParams::tab(closed, false));
    let added = f
        .selector
        .open_new_tab("https://example.test/late", false, TabLaunchType::FromLink)
        .expect("tab");

    let barrier = f.store.coordinator().borrow().wait_for_tab_files();
    barrier.await.expect("tab files");
    let events = drain(&mut f.events).await;

    assert_eq!(metadata_saves(&events), 0);
    assert!(events.contains(&PersistenceEvent::TabStateDeleted {
        tab_id: closed,
        incognito: false
    }));
    assert!(events.contains(&PersistenceEvent::TabStateWritten {
        tab_id: added,
        incognito: false
    }));
    assert!(!f.store.layout().tab_file_path(closed, false).exists());
    assert_eq!(saved_tab_count(&f), 3);
}

#[tokio::test]
async fn resume_saves_exactly_once() {
    let mut f = fixture(2).await;
    f.store.coordinator().borrow_mut().pause_save_tab_list();
    for i in 0..5 {
        f.selector
            .open_new_tab(format!("https://example.test/p{i}"), false, TabLaunchType::FromLink)
            .expect("tab");
    }
    assert_eq!(metadata_saves(&drain(&mut f.events).await), 0);

    let (tx, rx) = tokio::sync::oneshot::channel();
    f.store
        .coordinator()
        .borrow_mut()
        .resume_save_tab_list(Some(Box::new(move || {
            let _ = tx.send(());
        })));
    rx.await.expect("completion callback");

    let events = drain(&mut f.events).await;
    assert_eq!(metadata_saves(&events), 1);
    assert!(events.contains(&PersistenceEvent::MetadataSaved {
        window: InstanceId::new(0),
        tab_count: 7
    }));
    assert_eq!(saved_tab_count(&f), 7);
}

#[tokio::test]
async fn resume_without_changes_still_saves() {
    let mut f = fixture(1).await;
    f.store.coordinator().borrow_mut().pause_save_tab_list();
    f.store.coordinator().borrow_mut().resume_save_tab_list(None);
    assert_eq!(metadata_saves(&drain(&mut f.events).await), 1);
}

#[tokio::test]
async fn unpaused_changes_are_saved_in_background() {
    let mut f = fixture(1).await;
    let id = f.selector.current_model().expect("model").tab_at(0).expect("tab").id();
    f.selector.current_model_mut().expect("model").pin_tab(id);

    let events = drain(&mut f.events).await;
    assert!(metadata_saves(&events) >= 1);
    let path = f.store.layout().metadata_path(InstanceId::new(0));
    let metadata = PersistedMetadata::load_from_file(&path).expect("metadata");
    assert!(metadata.regular.tabs[0].pinned);
    assert_eq!(metadata.regular.tabs[0].id, id);
}

#[tokio::test]
async fn pause_withdraws_save_waiting_on_debounce() {
    let settings = PersistenceSettings::default().with_save_debounce_ms(300);
    let mut f = fixture_with(1, settings).await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    drain(&mut f.events).await;

    f.selector
        .open_new_tab("https://example.test/queued", false, TabLaunchType::FromLink)
        .expect("tab");
    f.store.coordinator().borrow_mut().pause_save_tab_list();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(metadata_saves(&drain(&mut f.events).await), 0);
    assert_eq!(saved_tab_count(&f), 1);

    let (tx, rx) = tokio::sync::oneshot::channel();
    f.store
        .coordinator()
        .borrow_mut()
        .resume_save_tab_list(Some(Box::new(move || {
            let _ = tx.send(());
        })));
    rx.await.expect("completion callback");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(metadata_saves(&drain(&mut f.events).await), 1);
    assert_eq!(saved_tab_count(&f), 2);
}
