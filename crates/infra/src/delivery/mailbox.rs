use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use keydrop_core::{DeliveryHandle, RecipientId};

use super::channel::{DeliveryChannel, DeliveryError, DeliveryPayload, RetractOutcome, SendOutcome};

/// A message sitting in a recipient's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailboxMessage {
    pub handle: DeliveryHandle,
    pub payload: DeliveryPayload,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MailboxState {
    inboxes: HashMap<RecipientId, Vec<MailboxMessage>>,
    closed: HashSet<RecipientId>,
    next_handle: u64,
    failing: bool,
}

/// In-process private messaging channel.
///
/// - one inbox per recipient
/// - recipients can refuse private messages (sends come back `Blocked`)
/// - recipients can delete their own messages (later retractions see `NotFound`)
/// - optional artificial latency, to keep operations in flight in tests
#[derive(Debug, Default)]
pub struct InMemoryMailbox {
    state: Mutex<MailboxState>,
    latency: Option<Duration>,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn inbox(&self, recipient: RecipientId) -> Vec<MailboxMessage> {
        self.lock().inboxes.get(&recipient).cloned().unwrap_or_default()
    }

    pub fn set_accepts_direct_messages(&self, recipient: RecipientId, accepts: bool) {
        let mut state = self.lock();
        if accepts {
            state.closed.remove(&recipient);
        } else {
            state.closed.insert(recipient);
        }
    }

    pub fn accepts_direct_messages(&self, recipient: RecipientId) -> bool {
        !self.lock().closed.contains(&recipient)
    }

    /// Recipient-side deletion. Returns whether the message existed.
    pub fn delete_message(&self, recipient: RecipientId, handle: DeliveryHandle) -> bool {
        Self::remove(&mut self.lock(), recipient, handle)
    }

    /// Make every subsequent call fail with a transport error (or recover).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn remove(state: &mut MailboxState, recipient: RecipientId, handle: DeliveryHandle) -> bool {
        let Some(inbox) = state.inboxes.get_mut(&recipient) else {
            return false;
        };
        let before = inbox.len();
        inbox.retain(|m| m.handle != handle);
        let removed = inbox.len() != before;
        if inbox.is_empty() {
            state.inboxes.remove(&recipient);
        }
        removed
    }

    fn check_transport(state: &MailboxState) -> Result<(), DeliveryError> {
        if state.failing {
            Err(DeliveryError::Transport("mailbox unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for InMemoryMailbox {
    async fn send(&self, recipient: RecipientId, payload: &DeliveryPayload) -> Result<SendOutcome, DeliveryError> {
        self.simulate_latency().await;

        let mut state = self.lock();
        Self::check_transport(&state)?;
        if state.closed.contains(&recipient) {
            return Ok(SendOutcome::Blocked);
        }

        state.next_handle += 1;
        let handle = DeliveryHandle::new(state.next_handle);
        state.inboxes.entry(recipient).or_default().push(MailboxMessage {
            handle,
            payload: payload.clone(),
            delivered_at: Utc::now(),
        });

        Ok(SendOutcome::Delivered(handle))
    }

    async fn retract(&self, recipient: RecipientId, handle: DeliveryHandle) -> Result<RetractOutcome, DeliveryError> {
        self.simulate_latency().await;

        let mut state = self.lock();
        Self::check_transport(&state)?;
        if Self::remove(&mut state, recipient, handle) {
            Ok(RetractOutcome::Retracted)
        } else {
            Ok(RetractOutcome::NotFound)
        }
    }
}
