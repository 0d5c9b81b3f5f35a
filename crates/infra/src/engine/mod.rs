//! Entitlement engine (application-level orchestration).
//!
//! The engine composes the catalog store, the grant index, the delivery channel,
//! the admin check and the log sink into the four operations the command
//! surface exposes.
//!
//! ## Grant flow
//!
//! ```text
//! grant(actor, recipient, product)
//!   ↓
//! 1. Authorize (admin capability)
//!   ↓
//! 2. Lock the (recipient, product) pair
//!   ↓
//! 3. Resolve the link from the catalog
//!   ↓
//! 4. Send the private message (no state lock held)
//!   ↓
//! 5. Record the handle in the grant index
//!   ↓
//! 6. Apply the supersede policy to the previous handle, if any
//!   ↓
//! 7. Emit a log event (best effort)
//! ```
//!
//! ## Error semantics
//!
//! - Rejected calls (`Unauthorized`, `UnknownProduct`, `DeliveryBlocked`,
//!   `NoActiveGrant`, `DeliveryFailed`) leave catalog and grant index untouched.
//! - `Persistence` is the one partial failure: the catalog changed in memory
//!   but the durable copy did not.
//! - Log emission, revocation notices and supersede retractions never turn a
//!   successful operation into an error.

mod error;
mod pair_locks;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use keydrop_auth::{Actor, AdminCheck, authorize_admin};
use keydrop_core::{DeliveryHandle, RecipientId};
use keydrop_events::{EntitlementEvent, GrantRevoked, LogEnvelope, LogSink, ProductGranted, ProductRegistered};
use keydrop_grants::Grant;

use crate::catalog_store::CatalogStore;
use crate::delivery::{DeliveryChannel, DeliveryPayload, RetractOutcome, SendOutcome};
use crate::durable_store::DurableStore;
use crate::grant_store::SharedGrantIndex;

pub use error::EngineError;

use pair_locks::PairLocks;

/// What happens to the previous artifact when a pair is granted again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersedePolicy {
    /// Retract the old message once the new one is delivered and recorded.
    #[default]
    Retract,
    /// Forget the old handle; the old message stays in the recipient's inbox.
    Keep,
}

impl std::str::FromStr for SupersedePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retract" => Ok(SupersedePolicy::Retract),
            "keep" => Ok(SupersedePolicy::Keep),
            other => Err(format!("unknown supersede policy '{other}' (expected 'retract' or 'keep')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub link: String,
    /// Previous link, when the name was already registered.
    pub replaced: Option<String>,
}

/// Fate of the handle a re-grant displaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "handle", rename_all = "snake_case")]
pub enum SupersededGrant {
    Kept(DeliveryHandle),
    Retracted(DeliveryHandle),
    /// The recipient had already deleted the old message.
    AlreadyGone(DeliveryHandle),
    /// Retraction failed; the old message may still be visible.
    RetractFailed(DeliveryHandle),
}

impl SupersededGrant {
    pub fn handle(&self) -> DeliveryHandle {
        match *self {
            SupersededGrant::Kept(h)
            | SupersededGrant::Retracted(h)
            | SupersededGrant::AlreadyGone(h)
            | SupersededGrant::RetractFailed(h) => h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantConfirmation {
    pub recipient: RecipientId,
    pub product: String,
    pub handle: DeliveryHandle,
    pub superseded: Option<SupersededGrant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevokeOutcome {
    /// Artifact retracted and grant removed.
    Revoked { notice_delivered: bool },
    /// Grant removed, but the artifact was already gone.
    ArtifactMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "names", rename_all = "snake_case")]
pub enum ProductListing {
    Empty,
    Products(Vec<String>),
}

impl ProductListing {
    pub fn names(&self) -> &[String] {
        match self {
            ProductListing::Empty => &[],
            ProductListing::Products(names) => names,
        }
    }
}

/// Membership-gated entitlement distributor.
///
/// ## Concurrency
///
/// - Catalog and grant index each sit behind their own short-lived lock; no
///   lock on shared state is held across an `.await`.
/// - grant/revoke for the same (recipient, product) pair are serialized by a
///   per-pair async mutex held for the whole operation, so the last committed
///   operation wins. Distinct pairs run concurrently.
///
/// ## Generic Parameters
///
/// - `S`: durable store backing the catalog
/// - `D`: delivery channel
/// - `A`: admin capability check
/// - `L`: log sink for [`EntitlementEvent`]s
#[derive(Debug)]
pub struct EntitlementEngine<S, D, A, L> {
    catalog: CatalogStore<S>,
    grants: SharedGrantIndex,
    delivery: D,
    admin: A,
    log: L,
    pair_locks: PairLocks,
    supersede: SupersedePolicy,
}

impl<S, D, A, L> EntitlementEngine<S, D, A, L>
where
    S: DurableStore,
    D: DeliveryChannel,
    A: AdminCheck,
    L: LogSink<LogEnvelope<EntitlementEvent>>,
{
    pub fn new(catalog: CatalogStore<S>, delivery: D, admin: A, log: L) -> Self {
        Self {
            catalog,
            grants: SharedGrantIndex::new(),
            delivery,
            admin,
            log,
            pair_locks: PairLocks::default(),
            supersede: SupersedePolicy::default(),
        }
    }

    pub fn with_supersede_policy(mut self, policy: SupersedePolicy) -> Self {
        self.supersede = policy;
        self
    }

    pub fn supersede_policy(&self) -> SupersedePolicy {
        self.supersede
    }

    pub fn catalog(&self) -> &CatalogStore<S> {
        &self.catalog
    }

    pub fn grants(&self) -> &SharedGrantIndex {
        &self.grants
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn log_sink(&self) -> &L {
        &self.log
    }

    /// Register or overwrite a product. Admin only.
    ///
    /// The log event is emitted even when persistence fails, since the
    /// in-memory catalog has changed either way.
    pub fn register(&self, actor: &Actor, name: &str, link: &str) -> Result<Registration, EngineError> {
        authorize_admin(&self.admin, actor)?;

        let result = self.catalog.register(name, link);
        let replaced = match &result {
            Ok(replaced) => replaced.clone(),
            Err(err) => err.replaced.clone(),
        };

        tracing::info!(
            actor_id = %actor.id(),
            product = name,
            replaced = replaced.is_some(),
            "product registered"
        );
        self.emit(
            actor,
            EntitlementEvent::ProductRegistered(ProductRegistered {
                name: name.to_string(),
                link: link.to_string(),
                replaced: replaced.is_some(),
                occurred_at: Utc::now(),
            }),
        );

        result?;
        Ok(Registration {
            name: name.to_string(),
            link: link.to_string(),
            replaced,
        })
    }

    /// Deliver a product to a recipient by private message. Admin only.
    pub async fn grant(
        &self,
        actor: &Actor,
        recipient: RecipientId,
        product: &str,
    ) -> Result<GrantConfirmation, EngineError> {
        authorize_admin(&self.admin, actor)?;

        let _pair = self.pair_locks.acquire(recipient, product).await;

        let link = self
            .catalog
            .lookup(product)
            .ok_or_else(|| EngineError::UnknownProduct(product.to_string()))?;

        let payload = DeliveryPayload::grant(product, &link);
        let handle = match self.delivery.send(recipient, &payload).await? {
            SendOutcome::Delivered(handle) => handle,
            SendOutcome::Blocked => {
                tracing::info!(%recipient, product, "grant rejected: recipient blocks private messages");
                return Err(EngineError::DeliveryBlocked(recipient));
            }
        };

        let previous = self.grants.record(recipient, product, handle);
        let superseded = match previous {
            Some(old) => Some(self.settle_superseded(recipient, product, old).await),
            None => None,
        };

        tracing::info!(
            actor_id = %actor.id(),
            %recipient,
            product,
            %handle,
            superseded = superseded.is_some(),
            "product granted"
        );
        self.emit(
            actor,
            EntitlementEvent::ProductGranted(ProductGranted {
                recipient,
                product: product.to_string(),
                handle,
                superseded: previous,
                occurred_at: Utc::now(),
            }),
        );

        Ok(GrantConfirmation {
            recipient,
            product: product.to_string(),
            handle,
            superseded,
        })
    }

    /// Retract a delivered product and forget the grant. Admin only.
    pub async fn revoke(&self, actor: &Actor, recipient: RecipientId, product: &str) -> Result<RevokeOutcome, EngineError> {
        authorize_admin(&self.admin, actor)?;

        let _pair = self.pair_locks.acquire(recipient, product).await;

        let handle = self.grants.lookup(recipient, product).ok_or_else(|| EngineError::NoActiveGrant {
            recipient,
            product: product.to_string(),
        })?;

        // A transport failure leaves the grant tracked so the revoke can be retried.
        let retracted = self.delivery.retract(recipient, handle).await?;
        self.grants.remove_if(recipient, product, handle);

        let outcome = match retracted {
            RetractOutcome::NotFound => {
                tracing::info!(%recipient, product, %handle, "grant revoked; artifact was already gone");
                RevokeOutcome::ArtifactMissing
            }
            RetractOutcome::Retracted => {
                let notice_delivered = self.send_revocation_notice(recipient, product).await;
                tracing::info!(actor_id = %actor.id(), %recipient, product, notice_delivered, "grant revoked");
                RevokeOutcome::Revoked { notice_delivered }
            }
        };

        self.emit(
            actor,
            EntitlementEvent::GrantRevoked(GrantRevoked {
                recipient,
                product: product.to_string(),
                artifact_missing: outcome == RevokeOutcome::ArtifactMissing,
                occurred_at: Utc::now(),
            }),
        );

        Ok(outcome)
    }

    /// Product names, sorted. Open to every actor.
    pub fn list(&self, actor: &Actor) -> ProductListing {
        let names = self.catalog.list_names();
        tracing::debug!(actor_id = %actor.id(), products = names.len(), "catalog listed");

        if names.is_empty() {
            ProductListing::Empty
        } else {
            ProductListing::Products(names)
        }
    }

    /// Active grants of one recipient, sorted by product name.
    pub fn grants_for(&self, recipient: RecipientId) -> Vec<Grant> {
        self.grants.grants_for(recipient)
    }

    async fn settle_superseded(&self, recipient: RecipientId, product: &str, old: DeliveryHandle) -> SupersededGrant {
        if self.supersede == SupersedePolicy::Keep {
            return SupersededGrant::Kept(old);
        }

        match self.delivery.retract(recipient, old).await {
            Ok(RetractOutcome::Retracted) => SupersededGrant::Retracted(old),
            Ok(RetractOutcome::NotFound) => SupersededGrant::AlreadyGone(old),
            Err(err) => {
                tracing::warn!(%recipient, product, handle = %old, error = %err, "failed to retract superseded artifact");
                SupersededGrant::RetractFailed(old)
            }
        }
    }

    async fn send_revocation_notice(&self, recipient: RecipientId, product: &str) -> bool {
        let notice = DeliveryPayload::revocation_notice(product);
        match self.delivery.send(recipient, &notice).await {
            Ok(SendOutcome::Delivered(_)) => true,
            Ok(SendOutcome::Blocked) => {
                tracing::warn!(%recipient, product, "revocation notice not sent: recipient blocks private messages");
                false
            }
            Err(err) => {
                tracing::warn!(%recipient, product, error = %err, "revocation notice not sent");
                false
            }
        }
    }

    fn emit(&self, actor: &Actor, event: EntitlementEvent) {
        if let Err(err) = self.log.emit(LogEnvelope::record(actor.id(), event)) {
            tracing::debug!(error = ?err, "log sink rejected event");
        }
    }
}
