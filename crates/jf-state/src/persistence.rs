//! Persistence adapter
//!
//! Binds a [`SnapshotStore`] to a storage key. `load` and `save` are
//! best-effort: failures are logged and swallowed so the game keeps running
//! on its in-memory state.

use std::sync::Arc;

use crate::error::StoreResult;
use crate::snapshot::SessionSnapshot;
use crate::store::{MemoryStore, SnapshotStore};

/// Default storage key. Bump the version suffix to abandon old saves.
pub const DEFAULT_STORAGE_KEY: &str = "justfun-slot-v1";

/// Snapshot persistence bound to one storage key
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn SnapshotStore>,
    key: String,
}

impl Persistence {
    /// Create an adapter over `store` writing under `key`
    pub fn new(store: Arc<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Adapter over a fresh in-memory store
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), key)
    }

    /// Storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Load the stored snapshot, falling back to `defaults` field by field.
    /// Read failures yield `defaults`.
    pub fn load(&self, defaults: &SessionSnapshot) -> SessionSnapshot {
        match self.store.read(&self.key) {
            Ok(Some(json)) => {
                log::debug!("[Persistence] Loaded snapshot from {:?}", self.key);
                SessionSnapshot::from_json(&json, defaults)
            }
            Ok(None) => *defaults,
            Err(e) => {
                log::warn!("[Persistence] Failed to read {:?}: {}", self.key, e);
                *defaults
            }
        }
    }

    /// Write a snapshot, reporting failure
    pub fn try_save(&self, snapshot: &SessionSnapshot) -> StoreResult<()> {
        let json = snapshot.to_json()?;
        self.store.write(&self.key, &json)
    }

    /// Write a snapshot; failures are logged and otherwise ignored
    pub fn save(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.try_save(snapshot) {
            log::warn!("[Persistence] Failed to save {:?}: {}", self.key, e);
        }
    }

    /// Forget the stored snapshot
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::warn!("[Persistence] Failed to clear {:?}: {}", self.key, e);
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn read(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn write(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::InvalidKey(String::new()))
        }
    }

    #[test]
    fn test_load_without_save_gives_defaults() {
        let persistence = Persistence::in_memory(DEFAULT_STORAGE_KEY);
        let defaults = SessionSnapshot::new(100, 1);
        assert_eq!(persistence.load(&defaults), defaults);
    }

    #[test]
    fn test_save_then_load() {
        let persistence = Persistence::in_memory(DEFAULT_STORAGE_KEY);
        let mut snapshot = SessionSnapshot::new(80, 2);
        snapshot.total_spins = 20;
        persistence.save(&snapshot);

        let loaded = persistence.load(&SessionSnapshot::new(100, 1));
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_version_bump_abandons_old_data() {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let v1 = Persistence::new(Arc::clone(&store), "justfun-slot-v1");
        v1.save(&SessionSnapshot::new(5, 1));

        let v2 = Persistence::new(store, "justfun-slot-v2");
        assert_eq!(v2.load(&SessionSnapshot::new(100, 1)).credits, 100);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let persistence = Persistence::new(Arc::new(BrokenStore), "k");
        let defaults = SessionSnapshot::new(100, 1);

        assert_eq!(persistence.load(&defaults), defaults);
        persistence.save(&defaults);
        persistence.clear();
        assert!(persistence.try_save(&defaults).is_err());
    }
}
