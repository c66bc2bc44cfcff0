//! Tab records and identifiers
//!
//! - `types` - identifier newtypes (`TabId`, `TabGroupId`, `InstanceId`) and enums
//! - `record` - the `Tab` record
//! - `id_allocator` - session-wide `TabIdAllocator`

mod id_allocator;
mod record;
mod types;

pub use id_allocator::TabIdAllocator;
pub use record::Tab;
pub use types::{
    InstanceId, ProfileMode, TabCreationState, TabGroupColor, TabGroupId, TabId, TabLaunchType,
    TabSelectionType,
};
