//! Catalog Store: the in-memory catalog plus its durable copy.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use keydrop_catalog::Catalog;

use crate::durable_store::{DurableStore, StoreError};

/// The in-memory catalog changed but the durable write failed.
///
/// Memory is not rolled back: lookups already see the new link, and the disk
/// copy stays stale until the next successful write.
#[derive(Debug, Error)]
#[error("catalog updated in memory but not persisted: {source}")]
pub struct PersistenceError {
    /// Link that the registration replaced, if any.
    pub replaced: Option<String>,
    #[source]
    pub source: StoreError,
}

/// Catalog with write-through persistence.
///
/// One mutex guards both the map and the durable write of each mutation, so
/// concurrent registrations are applied and written in the same order.
#[derive(Debug)]
pub struct CatalogStore<S> {
    catalog: Mutex<Catalog>,
    store: S,
}

impl<S: DurableStore> CatalogStore<S> {
    /// Load the catalog once from `store`. An absent store loads as empty.
    pub fn load(store: S) -> Result<Self, StoreError> {
        let catalog = match store.read_all()? {
            Some(entries) => Catalog::from_entries(entries),
            None => Catalog::new(),
        };
        tracing::info!(products = catalog.len(), "catalog loaded");

        Ok(Self {
            catalog: Mutex::new(catalog),
            store,
        })
    }

    /// Upsert `name -> link` and persist the whole catalog.
    ///
    /// Returns the replaced link, if any.
    pub fn register(&self, name: &str, link: &str) -> Result<Option<String>, PersistenceError> {
        let mut catalog = self.lock();
        let replaced = catalog.register(name, link);

        match self.store.write_all(catalog.entries()) {
            Ok(()) => Ok(replaced),
            Err(source) => {
                tracing::warn!(product = name, error = %source, "catalog persistence failed; memory and disk diverge");
                Err(PersistenceError { replaced, source })
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        self.lock().lookup(name).map(str::to_string)
    }

    pub fn list_names(&self) -> Vec<String> {
        self.lock().names()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Point-in-time copy of the in-memory catalog.
    pub fn snapshot(&self) -> Catalog {
        self.lock().clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // A panic mid-mutation leaves a fully applied or untouched map, never a
    // torn one, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
