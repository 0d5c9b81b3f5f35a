use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use keydrop_catalog::CatalogEntries;

use super::r#trait::{DurableStore, StoreError};

/// In-memory durable store.
///
/// Intended for tests/dev. Can be switched into a failing mode to exercise the
/// persistence-error paths.
#[derive(Debug, Default)]
pub struct InMemoryDurableStore {
    contents: RwLock<Option<CatalogEntries>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously "persisted" catalog.
    pub fn with_entries(entries: CatalogEntries) -> Self {
        Self {
            contents: RwLock::new(Some(entries)),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// What a fresh process would load right now.
    pub fn contents(&self) -> Option<CatalogEntries> {
        self.contents.read().ok().and_then(|c| c.clone())
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DurableStore for InMemoryDurableStore {
    fn read_all(&self) -> Result<Option<CatalogEntries>, StoreError> {
        let contents = self
            .contents
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(contents.clone())
    }

    fn write_all(&self, entries: &CatalogEntries) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected (failing mode)".to_string()));
        }

        let mut contents = self
            .contents
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *contents = Some(entries.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
