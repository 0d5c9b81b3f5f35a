//! Shared, lock-guarded Grant Index.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use keydrop_core::{DeliveryHandle, RecipientId};
use keydrop_grants::{Grant, GrantIndex};

/// Thread-safe wrapper around [`GrantIndex`].
///
/// Every method is one critical section; nothing here awaits, so the lock is
/// never held across delivery I/O. Not persisted across restarts.
#[derive(Debug, Default)]
pub struct SharedGrantIndex {
    inner: RwLock<GrantIndex>,
}

impl SharedGrantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, recipient: RecipientId, product: &str, handle: DeliveryHandle) -> Option<DeliveryHandle> {
        self.write().record_grant(recipient, product, handle)
    }

    pub fn lookup(&self, recipient: RecipientId, product: &str) -> Option<DeliveryHandle> {
        self.read().lookup_grant(recipient, product)
    }

    pub fn remove_if(&self, recipient: RecipientId, product: &str, expected: DeliveryHandle) -> bool {
        self.write().remove_grant_if(recipient, product, expected)
    }

    pub fn grants_for(&self, recipient: RecipientId) -> Vec<Grant> {
        self.read().grants_for(recipient)
    }

    pub fn grant_count(&self) -> usize {
        self.read().grant_count()
    }

    pub fn recipient_count(&self) -> usize {
        self.read().recipient_count()
    }

    pub fn snapshot(&self) -> GrantIndex {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, GrantIndex> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GrantIndex> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
