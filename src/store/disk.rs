use super::{PARTITION_NAME, SNAPSHOT_KEY};
use crate::core::cache::SnapshotStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Snapshot persisted in a fjall partition under a single namespaced key.
pub struct DiskSnapshotStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskSnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION_NAME, PartitionCreateOptions::default())
            .context("Failed to open cache partition")?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl SnapshotStore for DiskSnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(SNAPSHOT_KEY.as_bytes())?;
        debug!(
            "Snapshot {} for key: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            SNAPSHOT_KEY
        );
        Ok(value.map(|slice| slice.to_vec()))
    }

    fn save(&self, snapshot: &[u8]) -> Result<()> {
        self.partition
            .insert(SNAPSHOT_KEY.as_bytes(), snapshot)
            .context("Failed to write cache snapshot")?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Snapshot PUT ({} bytes, disk)", snapshot.len());
        Ok(())
    }
}
