use thiserror::Error;

use keydrop_auth::AuthzError;
use keydrop_core::RecipientId;

use crate::catalog_store::PersistenceError;
use crate::delivery::DeliveryError;

/// Failure of an engine operation.
///
/// Every variant except `Persistence` guarantees that neither the catalog nor
/// the grant index was changed by the failed call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("recipient {0} does not accept private messages")]
    DeliveryBlocked(RecipientId),

    #[error("recipient {recipient} has no active grant for '{product}'")]
    NoActiveGrant { recipient: RecipientId, product: String },

    /// The in-memory catalog was updated but the durable write failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    DeliveryFailed(#[from] DeliveryError),
}
