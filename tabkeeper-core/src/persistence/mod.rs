//! Tab state persistence
//!
//! This module provides:
//! - `StateLayout` - on-disk paths and file name conventions
//! - `PersistedMetadata` - the per-window metadata snapshot
//! - `TabStateStore` - per-tab content files
//! - `PersistenceCoordinator` - background saving driven by model observers
//! - `TabPersistentStore` - restore on startup and explicit saves
//! - `LegacyLayoutMigration` - one-time move of the legacy flat layout
//! - `cleanup_instance_state` - removal of a closed window's state

mod cleanup;
mod coordinator;
mod layout;
mod metadata;
mod migration;
mod store;
mod tab_state;

pub use cleanup::{cleanup_instance_state, compute_instance_cleanup, delete_tab_files};
pub use coordinator::{PersistenceCoordinator, PersistenceEvent, SaveCallback};
pub use layout::{
    INCOGNITO_TAB_FILE_PREFIX, METADATA_FILE_PREFIX, MIGRATION_RECORD_FILE, STATE_DIR_INDEX,
    StateLayout, TAB_FILE_PREFIX,
};
pub use metadata::{
    CollectionMetadata, GroupEntry, METADATA_FORMAT_VERSION, PersistedMetadata, TabEntry,
};
pub use migration::{LegacyLayoutMigration, MigrationHandle, MigrationOutcome, MigrationRecord};
pub use store::{RestoreSummary, TabPersistentStore};
pub use tab_state::{TAB_STATE_FORMAT_VERSION, TabState, TabStateStore};
