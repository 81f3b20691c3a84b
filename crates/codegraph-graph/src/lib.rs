pub mod primitives;
pub mod schema;
pub mod store;

pub use primitives::*;
pub use store::{
    resolve_snapshot_path, snapshot_exists, EdgeFilters, ModuleEdgeFilters, NodeFilters,
    SnapshotStore,
};
