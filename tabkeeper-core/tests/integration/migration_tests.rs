//! Integration tests for the legacy layout migration

use std::path::Path;

use tabkeeper_core::persistence::{LegacyLayoutMigration, MigrationOutcome, StateLayout};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).expect("write file");
}

fn seed_legacy_layout(base: &Path, regular: &[i32], incognito: &[i32]) {
    write(&base.join("tab_state"), "legacy metadata");
    for id in regular {
        write(&base.join(format!("tab{id}")), &format!("regular {id}"));
    }
    for id in incognito {
        write(&base.join(format!("incognito_tab{id}")), &format!("incognito {id}"));
    }
}

#[test]
fn moves_every_recognized_file() {
    let temp = TempDir::new().expect("temp dir");
    let base = temp.path();
    let regular = [0, 1, 2, 15, 40];
    let incognito = [3, 7, 22];
    seed_legacy_layout(base, &regular, &incognito);
    write(&base.join("bookmarks.json"), "{}");
    write(&base.join("tab_state.bak"), "backup");
    std::fs::create_dir(base.join("cache")).expect("mkdir");

    let layout = StateLayout::new(base);
    let outcome = LegacyLayoutMigration::new(layout.clone())
        .run()
        .expect("migration");
    assert_eq!(
        outcome,
        MigrationOutcome::Migrated {
            moved: 1 + regular.len() + incognito.len(),
            failed: 0,
        }
    );

    let state_dir = layout.state_dir();
    assert_eq!(
        std::fs::read_to_string(state_dir.join("tab_state0")).expect("metadata"),
        "legacy metadata"
    );
    assert!(!base.join("tab_state").exists());
    for id in regular {
        assert!(state_dir.join(format!("tab{id}")).is_file());
        assert!(!base.join(format!("tab{id}")).exists());
    }
    for id in incognito {
        assert_eq!(
            std::fs::read_to_string(state_dir.join(format!("incognito_tab{id}"))).expect("tab"),
            format!("incognito {id}")
        );
        assert!(!base.join(format!("incognito_tab{id}")).exists());
    }

    assert!(base.join("bookmarks.json").is_file());
    assert!(base.join("tab_state.bak").is_file());
    assert!(base.join("cache").is_dir());
    assert!(!state_dir.join("bookmarks.json").exists());
}

#[test]
fn skips_when_destination_has_content() {
    let temp = TempDir::new().expect("temp dir");
    let base = temp.path();
    seed_legacy_layout(base, &[1, 2], &[3]);
    let layout = StateLayout::new(base);
    std::fs::create_dir_all(layout.state_dir()).expect("mkdir");
    write(&layout.state_dir().join("tab9"), "newer");

    let migration = LegacyLayoutMigration::new(layout.clone());
    assert_eq!(
        migration.run().expect("migration"),
        MigrationOutcome::SkippedDestinationNotEmpty
    );

    assert!(base.join("tab_state").is_file());
    assert!(base.join("tab1").is_file());
    assert!(base.join("incognito_tab3").is_file());
    assert!(!layout.state_dir().join("tab1").exists());
    assert_eq!(
        std::fs::read_to_string(layout.state_dir().join("tab9")).expect("tab"),
        "newer"
    );
    assert!(migration.is_complete());
}

#[test]
fn runs_only_once() {
    let temp = TempDir::new().expect("temp dir");
    let base = temp.path();
    seed_legacy_layout(base, &[1], &[]);
    let layout = StateLayout::new(base);

    let first = LegacyLayoutMigration::new(layout.clone()).run().expect("first");
    assert!(matches!(first, MigrationOutcome::Migrated { moved: 2, .. }));

    // Files reappearing at the old location are not picked up again
    write(&base.join("tab5"), "late");
    let second = LegacyLayoutMigration::new(layout.clone()).run().expect("second");
    assert_eq!(second, MigrationOutcome::AlreadyMigrated);
    assert!(base.join("tab5").is_file());
    assert!(!layout.state_dir().join("tab5").exists());
}

#[tokio::test]
async fn background_migration_completes() {
    let temp = TempDir::new().expect("temp dir");
    seed_legacy_layout(temp.path(), &[4, 5], &[6]);
    let layout = StateLayout::new(temp.path());

    let handle = LegacyLayoutMigration::new(layout.clone()).spawn();
    let outcome = handle.wait().await.expect("migration");
    assert_eq!(outcome, MigrationOutcome::Migrated { moved: 4, failed: 0 });
    assert_eq!(layout.list_tab_files().expect("list").len(), 3);
}
