use crate::core::cache::SnapshotStore;
use anyhow::Result;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Keeps the snapshot in process memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshot.clone())
    }

    fn save(&self, snapshot: &[u8]) -> Result<()> {
        let mut current = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        *current = Some(snapshot.to_vec());
        debug!("Snapshot PUT ({} bytes, memory)", snapshot.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_snapshot_roundtrip() {
        let store = MemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(b"first").unwrap();
        store.save(b"second").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(&b"second"[..]));
    }
}
