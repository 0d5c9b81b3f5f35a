//! Infrastructure layer: durable catalog storage, grant tracking, delivery
//! channels and the entitlement engine that orchestrates them.

pub mod catalog_store;
pub mod delivery;
pub mod durable_store;
pub mod engine;
pub mod grant_store;


pub use catalog_store::{CatalogStore, PersistenceError};
pub use delivery::{
    DeliveryChannel, DeliveryError, DeliveryPayload, InMemoryMailbox, MailboxMessage, PayloadKind,
    RetractOutcome, SendOutcome,
};
pub use durable_store::{DurableStore, InMemoryDurableStore, JsonFileStore, StoreError};
pub use engine::{
    EngineError, EntitlementEngine, GrantConfirmation, ProductListing, Registration, RevokeOutcome,
    SupersedePolicy, SupersededGrant,
};
pub use grant_store::SharedGrantIndex;
