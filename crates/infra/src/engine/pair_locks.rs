use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use keydrop_core::RecipientId;

type PairKey = (RecipientId, String);

/// One async mutex per (recipient, product) pair.
///
/// Held for the whole of a grant or revoke, delivery round trips included, so
/// operations on one pair apply in arrival order while different pairs never
/// wait on each other.
#[derive(Debug, Default)]
pub(crate) struct PairLocks {
    locks: Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>,
}

impl PairLocks {
    pub(crate) async fn acquire(&self, recipient: RecipientId, product: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the map itself references idle locks.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry((recipient, product.to_string())).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
