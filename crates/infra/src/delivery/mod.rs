//! Delivery Channel: private messages to recipients, and their retraction.

pub mod channel;
pub mod mailbox;

pub use channel::{DeliveryChannel, DeliveryError, DeliveryPayload, PayloadKind, RetractOutcome, SendOutcome};
pub use mailbox::{InMemoryMailbox, MailboxMessage};
