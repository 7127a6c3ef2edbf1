pub mod persist;
pub mod store;

pub use persist::{configured_tier, Collection, SnapshotError, SnapshotStore, StorageTier};
pub use store::{EntityStore, StoreError};
