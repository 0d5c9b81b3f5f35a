use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use keydrop_core::{DeliveryHandle, RecipientId};

/// A tracked grant: the artifact delivered to `recipient` for `product_name`.
///
/// Grants snapshot the catalog at grant time; later catalog changes do not
/// touch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub recipient: RecipientId,
    pub product_name: String,
    pub handle: DeliveryHandle,
}

/// Index of active grants, keyed by recipient then product name.
///
/// Invariants:
/// - at most one handle per (recipient, product) pair
/// - no recipient is kept with an empty product map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantIndex {
    by_recipient: HashMap<RecipientId, HashMap<String, DeliveryHandle>>,
}

impl GrantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the handle for a pair.
    ///
    /// Returns the handle that was tracked before, if any. The caller decides
    /// what happens to the superseded artifact.
    pub fn record_grant(
        &mut self,
        recipient: RecipientId,
        product_name: impl Into<String>,
        handle: DeliveryHandle,
    ) -> Option<DeliveryHandle> {
        self.by_recipient
            .entry(recipient)
            .or_default()
            .insert(product_name.into(), handle)
    }

    pub fn lookup_grant(&self, recipient: RecipientId, product_name: &str) -> Option<DeliveryHandle> {
        self.by_recipient
            .get(&recipient)
            .and_then(|products| products.get(product_name))
            .copied()
    }

    /// Remove the pair, dropping the recipient entirely once nothing is left.
    pub fn remove_grant(&mut self, recipient: RecipientId, product_name: &str) -> Option<DeliveryHandle> {
        let products = self.by_recipient.get_mut(&recipient)?;
        let removed = products.remove(product_name);
        if products.is_empty() {
            self.by_recipient.remove(&recipient);
        }
        removed
    }

    /// Remove the pair only if it still tracks `expected`.
    ///
    /// Used when committing a revoke: if a newer grant replaced the handle in
    /// the meantime, the newer grant must stay.
    pub fn remove_grant_if(
        &mut self,
        recipient: RecipientId,
        product_name: &str,
        expected: DeliveryHandle,
    ) -> bool {
        if self.lookup_grant(recipient, product_name) == Some(expected) {
            self.remove_grant(recipient, product_name);
            true
        } else {
            false
        }
    }

    /// All grants held by one recipient, ordered by product name.
    pub fn grants_for(&self, recipient: RecipientId) -> Vec<Grant> {
        let Some(products) = self.by_recipient.get(&recipient) else {
            return Vec::new();
        };

        let mut grants: Vec<Grant> = products
            .iter()
            .map(|(product_name, handle)| Grant {
                recipient,
                product_name: product_name.clone(),
                handle: *handle,
            })
            .collect();
        grants.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        grants
    }

    pub fn recipient_count(&self) -> usize {
        self.by_recipient.len()
    }

    pub fn grant_count(&self) -> usize {
        self.by_recipient.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_recipient.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user1() -> RecipientId {
        RecipientId::new(1)
    }

    #[test]
    fn record_then_lookup() {
        let mut index = GrantIndex::new();
        assert_eq!(index.record_grant(user1(), "KeyA", DeliveryHandle::new(101)), None);

        assert_eq!(index.lookup_grant(user1(), "KeyA"), Some(DeliveryHandle::new(101)));
        assert_eq!(index.lookup_grant(user1(), "KeyB"), None);
        assert_eq!(index.lookup_grant(RecipientId::new(2), "KeyA"), None);
    }

    #[test]
    fn re_grant_overwrites_and_returns_previous_handle() {
        let mut index = GrantIndex::new();
        index.record_grant(user1(), "KeyA", DeliveryHandle::new(1));
        let previous = index.record_grant(user1(), "KeyA", DeliveryHandle::new(2));

        assert_eq!(previous, Some(DeliveryHandle::new(1)));
        assert_eq!(index.lookup_grant(user1(), "KeyA"), Some(DeliveryHandle::new(2)));
        assert_eq!(index.grant_count(), 1);
    }

    #[test]
    fn removing_last_grant_drops_recipient() {
        let mut index = GrantIndex::new();
        index.record_grant(user1(), "KeyA", DeliveryHandle::new(1));
        index.record_grant(user1(), "KeyB", DeliveryHandle::new(2));

        assert_eq!(index.remove_grant(user1(), "KeyA"), Some(DeliveryHandle::new(1)));
        assert_eq!(index.recipient_count(), 1);

        assert_eq!(index.remove_grant(user1(), "KeyB"), Some(DeliveryHandle::new(2)));
        assert_eq!(index.recipient_count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn removing_unknown_pair_is_a_no_op() {
        let mut index = GrantIndex::new();
        index.record_grant(user1(), "KeyA", DeliveryHandle::new(1));

        assert_eq!(index.remove_grant(user1(), "Ghost"), None);
        assert_eq!(index.remove_grant(RecipientId::new(9), "KeyA"), None);
        assert_eq!(index.grant_count(), 1);
    }

    #[test]
    fn conditional_remove_keeps_newer_grants() {
        let mut index = GrantIndex::new();
        index.record_grant(user1(), "KeyA", DeliveryHandle::new(2));

        assert!(!index.remove_grant_if(user1(), "KeyA", DeliveryHandle::new(1)));
        assert_eq!(index.lookup_grant(user1(), "KeyA"), Some(DeliveryHandle::new(2)));

        assert!(index.remove_grant_if(user1(), "KeyA", DeliveryHandle::new(2)));
        assert!(index.is_empty());
    }

    #[test]
    fn grants_for_is_sorted_by_product() {
        let mut index = GrantIndex::new();
        index.record_grant(user1(), "Zeta", DeliveryHandle::new(3));
        index.record_grant(user1(), "Alpha", DeliveryHandle::new(4));
        index.record_grant(RecipientId::new(2), "Other", DeliveryHandle::new(5));

        let names: Vec<_> = index
            .grants_for(user1())
            .into_iter()
            .map(|g| g.product_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert!(index.grants_for(RecipientId::new(3)).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Record(u64, u8, u64),
            Remove(u64, u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u64..4, 0u8..4, any::<u64>()).prop_map(|(r, p, h)| Op::Record(r, p, h)),
                (0u64..4, 0u8..4).prop_map(|(r, p)| Op::Remove(r, p)),
            ]
        }

        proptest! {
            /// Property: the index behaves like a flat map keyed by pair, and never
            /// keeps an empty recipient container.
            #[test]
            fn matches_flat_model(ops in proptest::collection::vec(op(), 0..64)) {
                let mut index = GrantIndex::new();
                let mut model: HashMap<(u64, String), u64> = HashMap::new();

                for op in ops {
                    match op {
                        Op::Record(r, p, h) => {
                            let name = format!("P{p}");
                            let prev = index.record_grant(RecipientId::new(r), name.clone(), DeliveryHandle::new(h));
                            let model_prev = model.insert((r, name), h);
                            prop_assert_eq!(prev.map(u64::from), model_prev);
                        }
                        Op::Remove(r, p) => {
                            let name = format!("P{p}");
                            let removed = index.remove_grant(RecipientId::new(r), &name);
                            let model_removed = model.remove(&(r, name));
                            prop_assert_eq!(removed.map(u64::from), model_removed);
                        }
                    }
                }

                prop_assert_eq!(index.grant_count(), model.len());
                let recipients: std::collections::HashSet<u64> = model.keys().map(|(r, _)| *r).collect();
                prop_assert_eq!(index.recipient_count(), recipients.len());
                for ((r, name), h) in &model {
                    prop_assert_eq!(index.lookup_grant(RecipientId::new(*r), name), Some(DeliveryHandle::new(*h)));
                }
            }
        }
    }
}
