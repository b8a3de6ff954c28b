pub mod disk;
pub mod memory;

use crate::core::cache::SnapshotStore;
use disk::DiskSnapshotStore;
use memory::MemorySnapshotStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub const PARTITION_NAME: &str = "fxcache";
pub const SNAPSHOT_KEY: &str = "currencies-store";

/// Picks the snapshot backend for the cache store.
///
/// Falls back to memory when persistence is off, no data path is known, or
/// the on-disk keyspace cannot be opened.
pub fn open_snapshot_store(data_path: Option<&Path>, persist: bool) -> Arc<dyn SnapshotStore> {
    if !persist {
        debug!("Cache persistence disabled");
        return Arc::new(MemorySnapshotStore::new());
    }

    let Some(data_path) = data_path else {
        warn!("No data directory available, cache will not persist");
        return Arc::new(MemorySnapshotStore::new());
    };

    match DiskSnapshotStore::open(&data_path.join("cache")) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Falling back to in-memory cache: {:#}", e);
            Arc::new(MemorySnapshotStore::new())
        }
    }
}
