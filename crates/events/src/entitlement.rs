use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keydrop_core::{DeliveryHandle, RecipientId};

use crate::Event;

/// Event: a product was registered (or its link replaced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistered {
    pub name: String,
    pub link: String,
    /// True when an existing entry with the same name was overwritten.
    pub replaced: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a product was delivered to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGranted {
    pub recipient: RecipientId,
    pub product: String,
    pub handle: DeliveryHandle,
    /// Handle of the grant this one replaced, if the pair was already granted.
    pub superseded: Option<DeliveryHandle>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a grant was revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRevoked {
    pub recipient: RecipientId,
    pub product: String,
    /// The delivered message was already gone when retraction was attempted.
    pub artifact_missing: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitlementEvent {
    ProductRegistered(ProductRegistered),
    ProductGranted(ProductGranted),
    GrantRevoked(GrantRevoked),
}

impl Event for EntitlementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EntitlementEvent::ProductRegistered(_) => "entitlements.product.registered",
            EntitlementEvent::ProductGranted(_) => "entitlements.grant.issued",
            EntitlementEvent::GrantRevoked(_) => "entitlements.grant.revoked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EntitlementEvent::ProductRegistered(e) => e.occurred_at,
            EntitlementEvent::ProductGranted(e) => e.occurred_at,
            EntitlementEvent::GrantRevoked(e) => e.occurred_at,
        }
    }
}
