use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use keydrop_core::{DeliveryHandle, RecipientId};

/// What a delivered message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Grant,
    RevocationNotice,
}

/// Message content handed to the channel. Rendering (embeds, colours, markup)
/// is up to the channel implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub kind: PayloadKind,
    pub product: String,
    pub title: String,
    pub body: String,
}

impl DeliveryPayload {
    /// The entitlement itself: product name plus its download link.
    pub fn grant(product: &str, link: &str) -> Self {
        Self {
            kind: PayloadKind::Grant,
            product: product.to_string(),
            title: format!("'{product}' delivered"),
            body: format!("Download link:\n[Click here]({link})"),
        }
    }

    /// Sent after a successful revocation.
    pub fn revocation_notice(product: &str) -> Self {
        Self {
            kind: PayloadKind::RevocationNotice,
            product: product.to_string(),
            title: "Delivery cancelled".to_string(),
            body: format!("Your delivery of '{product}' has been cancelled."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered(DeliveryHandle),
    /// The recipient does not accept private messages. Nothing was sent.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractOutcome {
    Retracted,
    /// The artifact no longer exists (e.g. the recipient deleted it).
    NotFound,
}

/// Channel failure other than the expected `Blocked` / `NotFound` outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("delivery transport failed: {0}")]
    Transport(String),
}

/// Private-message transport.
///
/// Calls may be slow network round trips. Implementations own their timeouts;
/// the engine never holds state locks across them.
#[async_trait::async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, recipient: RecipientId, payload: &DeliveryPayload) -> Result<SendOutcome, DeliveryError>;

    /// Delete a previously delivered artifact. Private messages are addressed
    /// through the recipient's conversation, hence the recipient argument.
    async fn retract(&self, recipient: RecipientId, handle: DeliveryHandle) -> Result<RetractOutcome, DeliveryError>;
}

#[async_trait::async_trait]
impl<C> DeliveryChannel for Arc<C>
where
    C: DeliveryChannel + ?Sized,
{
    async fn send(&self, recipient: RecipientId, payload: &DeliveryPayload) -> Result<SendOutcome, DeliveryError> {
        (**self).send(recipient, payload).await
    }

    async fn retract(&self, recipient: RecipientId, handle: DeliveryHandle) -> Result<RetractOutcome, DeliveryError> {
        (**self).retract(recipient, handle).await
    }
}
